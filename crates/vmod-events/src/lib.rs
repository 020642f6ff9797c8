//! Fire-and-forget broadcasting of analysis events.
//!
//! Delivery is at-most-once per event with no replay and no backpressure:
//! a slow or absent consumer never stalls the pipeline. Consumers must
//! reconcile authoritative state by re-reading the video record when they
//! receive `analysis-complete`.

use tokio::sync::broadcast;
use tracing::trace;

use vmod_models::{AnalysisEvent, SensitivityStatus, VideoId};

/// Default buffered event capacity per broadcaster.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Broadcast channel for `progress` and `analysis-complete` events.
///
/// Cloning is cheap; all clones publish into the same channel.
#[derive(Debug, Clone)]
pub struct EventBroadcaster {
    tx: broadcast::Sender<AnalysisEvent>,
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

impl EventBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an event. Never blocks; an absent consumer is not an error.
    pub fn emit(&self, event: AnalysisEvent) {
        trace!(
            event = event.name(),
            video_id = %event.video_id(),
            "broadcasting analysis event"
        );
        let _ = self.tx.send(event);
    }

    /// Publish a progress tick.
    pub fn progress(&self, video_id: &VideoId, percent: u8, stage: impl Into<String>) {
        self.emit(AnalysisEvent::progress(video_id.clone(), percent, stage));
    }

    /// Publish the terminal completion event for a run.
    pub fn completed(
        &self,
        video_id: &VideoId,
        status: SensitivityStatus,
        confidence: f64,
        elapsed_secs: f64,
    ) {
        self.emit(AnalysisEvent::completed(
            video_id.clone(),
            status,
            confidence,
            elapsed_secs,
        ));
    }

    /// Subscribe to all events from this broadcaster.
    pub fn subscribe(&self) -> broadcast::Receiver<AnalysisEvent> {
        self.tx.subscribe()
    }

    /// Number of live subscribers.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
