//! Thumbnail generation.

use std::path::Path;
use tokio::fs;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;

/// Output width for generated thumbnails.
pub const THUMBNAIL_SCALE_WIDTH: u32 = 480;

/// Pick the thumbnail timestamp for a video of the given duration.
///
/// One second in, or 10% of the duration for very short clips; falls back
/// to one second when that evaluates to zero.
pub fn thumbnail_timestamp(duration: f64) -> f64 {
    let ts = f64::min(1.0, 0.1 * duration);
    if ts > 0.0 {
        ts
    } else {
        1.0
    }
}

/// Generate a single-frame thumbnail at `timestamp` seconds.
pub async fn generate_thumbnail(
    video_path: impl AsRef<Path>,
    timestamp: f64,
    output_path: impl AsRef<Path>,
    runner: &FfmpegRunner,
) -> MediaResult<()> {
    let output_path = output_path.as_ref();
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let filter = format!("scale={}:-2", THUMBNAIL_SCALE_WIDTH);

    let cmd = FfmpegCommand::new(video_path.as_ref(), output_path)
        .seek(timestamp)
        .single_frame()
        .video_filter(&filter)
        .log_level("error");

    runner.run(&cmd).await
}
