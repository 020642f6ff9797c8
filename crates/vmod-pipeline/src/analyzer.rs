//! Analysis entry point and admission control.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use vmod_events::EventBroadcaster;
use vmod_media::MediaEngine;
use vmod_models::{AnalysisEvent, VideoId};
use vmod_store::VideoStore;

use crate::config::AnalysisConfig;
use crate::error::AdmissionError;

/// Orchestrates sensitivity analysis runs.
///
/// One `Analyzer` serves all videos; each admitted trigger becomes one
/// detached asynchronous task. At most one run is in flight per video id.
pub struct Analyzer {
    pub(crate) store: Arc<dyn VideoStore>,
    pub(crate) media: Arc<dyn MediaEngine>,
    pub(crate) events: EventBroadcaster,
    pub(crate) config: AnalysisConfig,
    inflight: Arc<Mutex<HashSet<VideoId>>>,
}

/// Releases a video's in-flight slot when the run task exits, on every
/// path including panics.
pub(crate) struct InflightGuard {
    set: Arc<Mutex<HashSet<VideoId>>>,
    id: VideoId,
}

impl Drop for InflightGuard {
    fn drop(&mut self) {
        if let Ok(mut set) = self.set.lock() {
            set.remove(&self.id);
        }
    }
}

impl Analyzer {
    pub fn new(
        store: Arc<dyn VideoStore>,
        media: Arc<dyn MediaEngine>,
        config: AnalysisConfig,
    ) -> Arc<Self> {
        let events = EventBroadcaster::new(config.event_capacity);
        Arc::new(Self {
            store,
            media,
            events,
            config,
            inflight: Arc::new(Mutex::new(HashSet::new())),
        })
    }

    /// Event broadcaster for `progress` / `analysis-complete` subscriptions.
    pub fn events(&self) -> &EventBroadcaster {
        &self.events
    }

    /// Subscribe to analysis events.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<AnalysisEvent> {
        self.events.subscribe()
    }

    /// Trigger analysis for a video.
    ///
    /// Returns as soon as the run is admitted; the pipeline executes as a
    /// detached task and its outcome is observable through the record
    /// store and the event channel. The in-flight reservation is taken
    /// under one lock, so concurrent triggers for the same id cannot both
    /// pass the admission checks.
    pub async fn trigger(self: &Arc<Self>, id: &VideoId) -> Result<(), AdmissionError> {
        // Reserve the in-flight slot before any await point.
        {
            let mut inflight = self
                .inflight
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if !inflight.insert(id.clone()) {
                return Err(AdmissionError::AlreadyInProgress);
            }
        }
        let guard = InflightGuard {
            set: Arc::clone(&self.inflight),
            id: id.clone(),
        };

        let candidate = match self.store.get(id).await? {
            Some(record) => record,
            None => return Err(AdmissionError::NotFound),
        };

        if candidate.analysis_done {
            return Err(AdmissionError::AlreadyAnalyzed);
        }
        if candidate.analysis_requested {
            return Err(AdmissionError::AlreadyInProgress);
        }

        // In-place update: a concurrent thumbnail write from a previous
        // run must not be overwritten by a stale copy.
        let record = match self
            .store
            .update(id, Box::new(|record| record.begin_processing()))
            .await?
        {
            Some(record) => record,
            None => return Err(AdmissionError::NotFound),
        };

        info!(video_id = %record.id, "analysis admitted");

        let analyzer = Arc::clone(self);
        tokio::spawn(async move {
            analyzer.run_guarded(record, guard).await;
        });

        Ok(())
    }

    /// Explicit external reset: revert a record to `uploaded` with
    /// sensitivity `pending` and a fresh retry budget.
    pub async fn reset(&self, id: &VideoId) -> Result<(), AdmissionError> {
        {
            let inflight = self
                .inflight
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if inflight.contains(id) {
                return Err(AdmissionError::AlreadyInProgress);
            }
        }

        if self
            .store
            .update(id, Box::new(|record| record.reset_analysis()))
            .await?
            .is_none()
        {
            return Err(AdmissionError::NotFound);
        }
        warn!(video_id = %id, "analysis state reset");
        Ok(())
    }
}
