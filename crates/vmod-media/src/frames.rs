//! Frame sampling: timestamp planning and reduced-resolution extraction.

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;

/// Plan evenly spaced sampling timestamps for a video of length `duration`.
///
/// For a known positive duration the plan is `k` strictly increasing interior
/// timestamps `t_i = i * duration / (k + 1)`, excluding the first and last
/// instants. When the duration is unknown or zero, the plan is a single
/// sample at the midpoint.
pub fn plan_timestamps(duration: f64, k: usize) -> Vec<f64> {
    if duration > 0.0 && k >= 1 {
        let step = duration / (k as f64 + 1.0);
        (1..=k).map(|i| i as f64 * step).collect()
    } else {
        vec![(duration / 2.0).max(0.0)]
    }
}

/// Extract one reduced-width frame per timestamp into `out_dir`.
///
/// Frames are written as `frame_000.jpg`, `frame_001.jpg`, ... Any
/// extraction failure is fatal; partial output is left for the caller's
/// directory cleanup.
pub async fn extract_frames(
    video_path: &Path,
    timestamps: &[f64],
    out_dir: &Path,
    width: u32,
    runner: &FfmpegRunner,
) -> MediaResult<Vec<PathBuf>> {
    fs::create_dir_all(out_dir).await?;

    let filter = format!("scale={}:-2", width);
    let mut frames = Vec::with_capacity(timestamps.len());

    for (i, &ts) in timestamps.iter().enumerate() {
        let frame_path = out_dir.join(format!("frame_{:03}.jpg", i));

        let cmd = FfmpegCommand::new(video_path, &frame_path)
            .seek(ts)
            .single_frame()
            .video_filter(&filter)
            .log_level("error");

        runner.run(&cmd).await?;
        frames.push(frame_path);
    }

    debug!(
        "Extracted {} frames from {} into {}",
        frames.len(),
        video_path.display(),
        out_dir.display()
    );

    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamps_strictly_interior_and_increasing() {
        for &(duration, k) in &[(10.0, 8usize), (5.0, 1), (3.0, 4), (120.0, 16)] {
            let plan = plan_timestamps(duration, k);
            assert_eq!(plan.len(), k);
            for window in plan.windows(2) {
                assert!(window[0] < window[1]);
            }
            for &t in &plan {
                assert!(t > 0.0 && t < duration, "t={} outside (0,{})", t, duration);
            }
        }
    }

    #[test]
    fn test_timestamps_evenly_spaced() {
        let plan = plan_timestamps(9.0, 8);
        let step = 9.0 / 9.0;
        for (i, &t) in plan.iter().enumerate() {
            let expected = (i as f64 + 1.0) * step;
            assert!((t - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_zero_duration_samples_midpoint_once() {
        assert_eq!(plan_timestamps(0.0, 8), vec![0.0]);
        assert_eq!(plan_timestamps(0.0, 1), vec![0.0]);
    }
}
