//! Pipeline configuration.

use std::path::PathBuf;

use vmod_models::Thresholds;

/// Configuration for the analysis pipeline.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Maximum analysis attempts before a record fails terminally
    pub max_retries: u32,
    /// Number of frames sampled per run
    pub frame_count: usize,
    /// Width of extracted frames in pixels
    pub frame_width: u32,
    /// Minimum pixel sampling stride for the classifier
    pub base_stride: usize,
    /// Minimum duration (seconds) required for a full analysis
    pub min_duration: f64,
    /// Average skin ratio above which content is sensitive
    pub avg_threshold: f64,
    /// Single-frame skin ratio above which content is sensitive
    pub max_threshold: f64,
    /// Root directory holding uploaded media files
    pub media_root: PathBuf,
    /// Directory for transient per-run frame directories
    pub work_dir: PathBuf,
    /// Directory for generated thumbnails
    pub thumbnails_dir: PathBuf,
    /// Buffered event capacity of the broadcaster
    pub event_capacity: usize,
    /// Kill ffmpeg invocations after this many seconds; none by default
    pub ffmpeg_timeout_secs: Option<u64>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            frame_count: 8,
            frame_width: 320,
            base_stride: 2,
            min_duration: 5.0,
            avg_threshold: 0.3,
            max_threshold: 0.45,
            media_root: PathBuf::from("uploads"),
            work_dir: std::env::temp_dir().join("vmod-frames"),
            thumbnails_dir: PathBuf::from("uploads/thumbnails"),
            event_capacity: 256,
            ffmpeg_timeout_secs: None,
        }
    }
}

impl AnalysisConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_retries: env_parse("ANALYSIS_MAX_RETRIES", defaults.max_retries),
            frame_count: env_parse("ANALYSIS_FRAME_COUNT", defaults.frame_count),
            frame_width: env_parse("ANALYSIS_FRAME_WIDTH", defaults.frame_width),
            base_stride: env_parse("ANALYSIS_BASE_STRIDE", defaults.base_stride),
            min_duration: env_parse("ANALYSIS_MIN_DURATION", defaults.min_duration),
            avg_threshold: env_parse("ANALYSIS_AVG_THRESHOLD", defaults.avg_threshold),
            max_threshold: env_parse("ANALYSIS_MAX_THRESHOLD", defaults.max_threshold),
            media_root: env_path("MEDIA_ROOT", defaults.media_root),
            work_dir: env_path("ANALYSIS_WORK_DIR", defaults.work_dir),
            thumbnails_dir: env_path("THUMBNAILS_DIR", defaults.thumbnails_dir),
            event_capacity: env_parse("ANALYSIS_EVENT_CAPACITY", defaults.event_capacity),
            ffmpeg_timeout_secs: env_parse_opt("ANALYSIS_FFMPEG_TIMEOUT_SECS"),
        }
    }

    /// Threshold set snapshot for the decision engine.
    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            min_duration: self.min_duration,
            avg_threshold: self.avg_threshold,
            max_threshold: self.max_threshold,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn env_parse_opt<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}

fn env_path(key: &str, default: PathBuf) -> PathBuf {
    std::env::var(key).map(PathBuf::from).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_decision_thresholds() {
        let config = AnalysisConfig::default();
        assert_eq!(config.thresholds(), Thresholds::default());
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.frame_count, 8);
        // No decoding timeout unless a deployment opts in
        assert_eq!(config.ffmpeg_timeout_secs, None);
    }
}
