//! The analysis stages of one run.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use vmod_analysis::{decide, skin_ratio_file, Aggregate, Decision};
use vmod_media::{plan_timestamps, thumbnail_timestamp, MediaInfo};
use vmod_models::VideoRecord;

use crate::analyzer::Analyzer;
use crate::error::PipelineResult;

impl Analyzer {
    /// Run the pipeline stages: probe, sample, classify, aggregate, decide.
    ///
    /// Probe failure and single-frame decode failures degrade softly;
    /// frame extraction failure is fatal and lands in the governor.
    pub(crate) async fn run_stages(
        &self,
        record: &mut VideoRecord,
        frames_dir: &Path,
    ) -> PipelineResult<Decision> {
        let video_id = record.id.clone();
        let source = self.config.media_root.join(&record.stored_name);

        self.events.progress(&video_id, 5, "starting analysis");

        let info = match self.media.probe(&source).await {
            Ok(info) => info,
            Err(e) => {
                warn!(
                    video_id = %video_id,
                    "probe failed, continuing with empty metadata: {}",
                    e
                );
                MediaInfo::default()
            }
        };
        self.refresh_probe_metadata(record, &info);
        self.events.progress(&video_id, 15, "metadata extracted");

        // Best-effort enrichment, never on the critical path.
        if record.thumbnail.is_none() {
            self.spawn_thumbnail(record, info.duration);
        }

        let aggregate = if info.has_video_stream {
            let timestamps = plan_timestamps(info.duration, self.config.frame_count);
            self.events.progress(&video_id, 30, "sampling frames");

            let frames = self
                .media
                .extract_frames(&source, &timestamps, frames_dir, self.config.frame_width)
                .await?;
            self.events.progress(&video_id, 50, "classifying frames");

            let ratios = classify_frames(frames, self.config.base_stride).await;
            self.events.progress(&video_id, 70, "frames classified");

            Aggregate::from_ratios(&ratios)
        } else {
            warn!(video_id = %video_id, "no video stream detected");
            Aggregate::from_ratios(&[])
        };
        self.events.progress(&video_id, 85, "aggregating results");

        let decision = decide(
            &aggregate,
            info.duration,
            info.has_video_stream,
            &self.config.thresholds(),
        );
        self.events.progress(&video_id, 95, "saving verdict");

        debug!(
            video_id = %video_id,
            avg = aggregate.avg,
            max = aggregate.max,
            frames = aggregate.frame_count,
            status = %decision.status,
            "decision reached"
        );

        Ok(decision)
    }

    fn refresh_probe_metadata(&self, record: &mut VideoRecord, info: &MediaInfo) {
        if info.duration > 0.0 {
            record.duration = info.duration;
        }
        if info.has_video_stream {
            record.width = info.width;
            record.height = info.height;
            record.codec = info.codec.clone();
        }
        if info.bitrate.is_some() {
            record.bitrate = info.bitrate;
        }
    }

    /// Generate a thumbnail as a detached side task.
    ///
    /// Failures are logged and swallowed; the run never waits for this.
    fn spawn_thumbnail(&self, record: &VideoRecord, duration: f64) {
        let media = Arc::clone(&self.media);
        let store = Arc::clone(&self.store);
        let video_id = record.id.clone();
        let source = self.config.media_root.join(&record.stored_name);
        let out_path = self
            .config
            .thumbnails_dir
            .join(format!("{}.jpg", video_id));

        tokio::spawn(async move {
            let ts = thumbnail_timestamp(duration);
            if let Err(e) = media.generate_thumbnail(&source, ts, &out_path).await {
                warn!(video_id = %video_id, "thumbnail generation failed: {}", e);
                return;
            }

            // A single-field atomic update: this task must never write
            // lifecycle state, whatever the run has persisted meanwhile.
            let relative = format!("thumbnails/{}.jpg", video_id);
            let result = store
                .update(
                    &video_id,
                    Box::new(move |record| {
                        if record.thumbnail.is_none() {
                            record.thumbnail = Some(relative);
                        }
                    }),
                )
                .await;
            match result {
                Ok(Some(_)) => debug!(video_id = %video_id, "thumbnail generated"),
                Ok(None) => {}
                Err(e) => {
                    warn!(video_id = %video_id, "failed to record thumbnail path: {}", e);
                }
            }
        });
    }
}

/// Classify all frames of a run concurrently.
///
/// Per-frame classification is independent; a decode failure degrades that
/// frame's ratio to 0 instead of aborting, and all workers are joined
/// regardless of individual failures.
async fn classify_frames(frames: Vec<PathBuf>, base_stride: usize) -> Vec<f64> {
    let handles: Vec<_> = frames
        .into_iter()
        .map(|path| tokio::task::spawn_blocking(move || skin_ratio_file(&path, base_stride)))
        .collect();

    let joined = futures::future::join_all(handles).await;

    joined
        .into_iter()
        .enumerate()
        .map(|(i, result)| match result {
            Ok(Ok(ratio)) => ratio,
            Ok(Err(e)) => {
                warn!(frame = i, "frame decode failed, degrading ratio to 0: {}", e);
                0.0
            }
            Err(e) => {
                warn!(frame = i, "frame classification task failed: {}", e);
                0.0
            }
        })
        .collect()
}
