//! The decoding/probing seam consumed by the analysis pipeline.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::command::FfmpegRunner;
use crate::error::MediaResult;
use crate::frames::extract_frames;
use crate::probe::{probe_media, MediaInfo};
use crate::thumbnail::generate_thumbnail;

/// External media decoding/probing capability.
///
/// The pipeline talks to FFmpeg only through this trait, so tests (and any
/// future decoder) can substitute their own implementation.
#[async_trait]
pub trait MediaEngine: Send + Sync {
    /// Probe a media file for metadata.
    async fn probe(&self, path: &Path) -> MediaResult<MediaInfo>;

    /// Materialize one reduced-width frame per timestamp into `out_dir`.
    async fn extract_frames(
        &self,
        path: &Path,
        timestamps: &[f64],
        out_dir: &Path,
        width: u32,
    ) -> MediaResult<Vec<PathBuf>>;

    /// Generate a single thumbnail frame at `timestamp` seconds.
    async fn generate_thumbnail(
        &self,
        path: &Path,
        timestamp: f64,
        out_path: &Path,
    ) -> MediaResult<()>;
}

/// Production engine shelling out to ffmpeg/ffprobe.
#[derive(Debug, Default, Clone)]
pub struct FfmpegEngine {
    runner: FfmpegRunner,
}

impl FfmpegEngine {
    /// Engine without a decoding timeout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine whose ffmpeg invocations are killed after `secs` seconds.
    pub fn with_timeout(secs: u64) -> Self {
        Self {
            runner: FfmpegRunner::new().with_timeout(secs),
        }
    }
}

#[async_trait]
impl MediaEngine for FfmpegEngine {
    async fn probe(&self, path: &Path) -> MediaResult<MediaInfo> {
        probe_media(path).await
    }

    async fn extract_frames(
        &self,
        path: &Path,
        timestamps: &[f64],
        out_dir: &Path,
        width: u32,
    ) -> MediaResult<Vec<PathBuf>> {
        extract_frames(path, timestamps, out_dir, width, &self.runner).await
    }

    async fn generate_thumbnail(
        &self,
        path: &Path,
        timestamp: f64,
        out_path: &Path,
    ) -> MediaResult<()> {
        generate_thumbnail(path, timestamp, out_path, &self.runner).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_reaches_the_runner() {
        assert_eq!(FfmpegEngine::new().runner.timeout_secs(), None);
        assert_eq!(FfmpegEngine::with_timeout(30).runner.timeout_secs(), Some(30));
    }
}
