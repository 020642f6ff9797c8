//! FFprobe media metadata extraction.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use crate::error::{MediaError, MediaResult};

/// Metadata extracted from a media file.
///
/// A file without a video stream still probes successfully with
/// `has_video_stream = false`; downstream classification treats that as a
/// verdict, not a pipeline error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaInfo {
    /// Duration in seconds (0 when unknown)
    pub duration: f64,
    /// Width in pixels
    pub width: Option<u32>,
    /// Height in pixels
    pub height: Option<u32>,
    /// Bitrate in bits/second
    pub bitrate: Option<u64>,
    /// Video codec name
    pub codec: Option<String>,
    /// Frame rate (fps, 0 when unknown)
    pub frame_rate: f64,
    /// Whether the file contains a video stream
    pub has_video_stream: bool,
}

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Default, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
    bit_rate: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: String,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
}

/// Probe a media file for metadata.
pub async fn probe_media(path: impl AsRef<Path>) -> MediaResult<MediaInfo> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)?;

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        return Err(MediaError::FfprobeFailed {
            message: "FFprobe failed".to_string(),
            stderr: Some(String::from_utf8_lossy(&output.stderr).to_string()),
        });
    }

    let probe: FfprobeOutput = serde_json::from_slice(&output.stdout)?;
    Ok(media_info_from_probe(probe))
}

fn media_info_from_probe(probe: FfprobeOutput) -> MediaInfo {
    let video_stream = probe.streams.iter().find(|s| s.codec_type == "video");

    let duration = probe
        .format
        .duration
        .as_ref()
        .and_then(|d| d.parse::<f64>().ok())
        .unwrap_or(0.0);

    let bitrate = probe
        .format
        .bit_rate
        .as_ref()
        .and_then(|b| b.parse::<u64>().ok());

    let frame_rate = video_stream
        .and_then(|s| s.avg_frame_rate.as_ref().or(s.r_frame_rate.as_ref()))
        .map(|r| parse_frame_rate(r))
        .unwrap_or(0.0);

    MediaInfo {
        duration,
        width: video_stream.and_then(|s| s.width),
        height: video_stream.and_then(|s| s.height),
        bitrate,
        codec: video_stream.and_then(|s| s.codec_name.clone()),
        frame_rate,
        has_video_stream: video_stream.is_some(),
    }
}

/// Parse a frame rate string (e.g. "30000/1001" or "29.97").
///
/// A zero denominator yields 0 rather than an error.
fn parse_frame_rate(s: &str) -> f64 {
    if let Some((num, den)) = s.split_once('/') {
        let num: f64 = match num.parse() {
            Ok(n) => n,
            Err(_) => return 0.0,
        };
        let den: f64 = match den.parse() {
            Ok(d) => d,
            Err(_) => return 0.0,
        };
        if den > 0.0 {
            return num / den;
        }
        return 0.0;
    }
    s.parse().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_frame_rate() {
        assert!((parse_frame_rate("30/1") - 30.0).abs() < 0.01);
        assert!((parse_frame_rate("30000/1001") - 29.97).abs() < 0.01);
        assert!((parse_frame_rate("29.97") - 29.97).abs() < 0.01);
    }

    #[test]
    fn test_parse_frame_rate_zero_denominator() {
        assert_eq!(parse_frame_rate("30/0"), 0.0);
        assert_eq!(parse_frame_rate("garbage"), 0.0);
    }

    #[test]
    fn test_audio_only_probe_has_no_video_stream() {
        let probe = FfprobeOutput {
            format: FfprobeFormat {
                duration: Some("12.5".to_string()),
                bit_rate: Some("128000".to_string()),
            },
            streams: vec![FfprobeStream {
                codec_type: "audio".to_string(),
                codec_name: Some("aac".to_string()),
                width: None,
                height: None,
                r_frame_rate: None,
                avg_frame_rate: None,
            }],
        };

        let info = media_info_from_probe(probe);
        assert!(!info.has_video_stream);
        assert_eq!(info.duration, 12.5);
        assert_eq!(info.frame_rate, 0.0);
        assert!(info.width.is_none());
    }

    #[test]
    fn test_video_probe_fields() {
        let probe = FfprobeOutput {
            format: FfprobeFormat {
                duration: Some("30".to_string()),
                bit_rate: None,
            },
            streams: vec![FfprobeStream {
                codec_type: "video".to_string(),
                codec_name: Some("h264".to_string()),
                width: Some(1920),
                height: Some(1080),
                r_frame_rate: Some("25/1".to_string()),
                avg_frame_rate: None,
            }],
        };

        let info = media_info_from_probe(probe);
        assert!(info.has_video_stream);
        assert_eq!(info.width, Some(1920));
        assert_eq!(info.codec.as_deref(), Some("h264"));
        assert!((info.frame_rate - 25.0).abs() < f64::EPSILON);
    }
}
