//! Retry/failure governor wrapping one analysis run.

use chrono::Utc;
use metrics::{counter, histogram};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use vmod_models::{AnalysisEvent, Sensitivity, SensitivityStatus, VideoId, VideoRecord};
use vmod_store::StoreResult;

use crate::analyzer::{Analyzer, InflightGuard};

impl Analyzer {
    /// Execute one guarded analysis run.
    ///
    /// All stage failures are converted into a recorded failure on the
    /// video record; nothing here propagates out of the detached task.
    /// The transient frame directory and the in-flight slot are released
    /// on every exit path.
    pub(crate) async fn run_guarded(&self, mut record: VideoRecord, _guard: InflightGuard) {
        let video_id = record.id.clone();
        let frames_dir: PathBuf = self.config.work_dir.join(video_id.as_str());

        // Retry budget exhausted: terminal verdict, no extraction.
        if record.analysis_retries >= self.config.max_retries {
            warn!(
                video_id = %video_id,
                retries = record.analysis_retries,
                "retry budget exhausted, failing terminally"
            );
            record.fail_terminal(Sensitivity {
                status: SensitivityStatus::Error,
                reason: "max retries exceeded".to_string(),
                confidence: 0.0,
                checked_at: Some(Utc::now()),
                details: None,
            });
            if let Err(e) = self.persist_run_state(&record).await {
                error!(video_id = %video_id, "failed to persist terminal failure: {}", e);
            }
            self.events.emit(AnalysisEvent::failed(
                video_id.clone(),
                SensitivityStatus::Error,
                record.processing_elapsed_secs().unwrap_or(0.0),
                "max retries exceeded",
            ));
            counter!("analysis_runs_total", "outcome" => "terminal").increment(1);
            return;
        }

        record.analysis_retries += 1;
        record.last_analysis_attempt = Some(Utc::now());
        if let Err(e) = self.persist_run_state(&record).await {
            error!(video_id = %video_id, "failed to record analysis attempt: {}", e);
        }

        let outcome = self.run_stages(&mut record, &frames_dir).await;

        match outcome {
            Ok(decision) => {
                let status = decision.status;
                let confidence = decision.confidence;
                record.complete_with(decision.into_sensitivity());
                if let Err(e) = self.persist_run_state(&record).await {
                    error!(video_id = %video_id, "failed to persist verdict: {}", e);
                }
                let elapsed = record.processing_elapsed_secs().unwrap_or(0.0);

                self.events.progress(&video_id, 100, "analysis complete");
                self.events.completed(&video_id, status, confidence, elapsed);

                counter!("analysis_runs_total", "outcome" => "ok").increment(1);
                histogram!("analysis_run_duration_seconds").record(elapsed);
                info!(
                    video_id = %video_id,
                    status = %status,
                    confidence,
                    elapsed,
                    "analysis completed"
                );
            }
            Err(e) => {
                error!(video_id = %video_id, "analysis run failed: {}", e);
                record.fail_with(e.to_string());
                if let Err(save_err) = self.persist_run_state(&record).await {
                    error!(video_id = %video_id, "failed to persist run failure: {}", save_err);
                }
                let elapsed = record.processing_elapsed_secs().unwrap_or(0.0);
                self.events.emit(AnalysisEvent::failed(
                    video_id.clone(),
                    record.sensitivity.status,
                    elapsed,
                    e.to_string(),
                ));
                counter!("analysis_runs_total", "outcome" => "failed").increment(1);
            }
        }

        // Guaranteed release of the transient per-run frame directory.
        self.cleanup_frames_dir(&video_id, &frames_dir).await;
    }

    /// Persist the run's view of the record.
    ///
    /// The replacement happens atomically in the store and keeps a
    /// thumbnail the detached side task may have recorded since this
    /// run's copy was read; the side task never writes lifecycle fields,
    /// so neither writer can lose the other's update.
    pub(crate) async fn persist_run_state(&self, record: &VideoRecord) -> StoreResult<()> {
        let snapshot = record.clone();
        self.store
            .update(
                &record.id,
                Box::new(move |stored| {
                    let thumbnail = stored.thumbnail.take();
                    *stored = snapshot;
                    if stored.thumbnail.is_none() {
                        stored.thumbnail = thumbnail;
                    }
                }),
            )
            .await?;
        Ok(())
    }

    async fn cleanup_frames_dir(&self, video_id: &VideoId, frames_dir: &Path) {
        match tokio::fs::remove_dir_all(frames_dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(
                    video_id = %video_id,
                    "failed to remove frame directory {}: {}",
                    frames_dir.display(),
                    e
                );
            }
        }
    }
}
