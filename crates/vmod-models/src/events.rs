//! Analysis event payloads.
//!
//! These events are broadcast fire-and-forget; consumers reconcile the
//! authoritative state by re-reading the video record on completion.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::sensitivity::SensitivityStatus;
use crate::video::VideoId;

/// Event published during an analysis run.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AnalysisEvent {
    /// Progress tick (percentages are monotonically increasing per run)
    Progress {
        #[serde(rename = "videoId")]
        video_id: VideoId,
        /// Progress percentage (0-100)
        percent: u8,
        /// Human-readable stage label
        stage: String,
        timestamp: DateTime<Utc>,
    },

    /// Terminal completion notification for a run
    #[serde(rename = "analysis-complete")]
    Completed {
        #[serde(rename = "videoId")]
        video_id: VideoId,
        /// Final sensitivity status
        status: SensitivityStatus,
        /// Final confidence in [0, 1]
        confidence: f64,
        /// Elapsed processing time in seconds
        #[serde(rename = "elapsedSecs")]
        elapsed_secs: f64,
        /// Failure message when the run did not produce a verdict
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
        timestamp: DateTime<Utc>,
    },
}

impl AnalysisEvent {
    /// Create a progress tick.
    pub fn progress(video_id: VideoId, percent: u8, stage: impl Into<String>) -> Self {
        AnalysisEvent::Progress {
            video_id,
            percent,
            stage: stage.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a completion event for a run that produced a verdict.
    pub fn completed(
        video_id: VideoId,
        status: SensitivityStatus,
        confidence: f64,
        elapsed_secs: f64,
    ) -> Self {
        AnalysisEvent::Completed {
            video_id,
            status,
            confidence,
            elapsed_secs,
            error: None,
            timestamp: Utc::now(),
        }
    }

    /// Create a completion event for a failed run.
    pub fn failed(
        video_id: VideoId,
        status: SensitivityStatus,
        elapsed_secs: f64,
        error: impl Into<String>,
    ) -> Self {
        AnalysisEvent::Completed {
            video_id,
            status,
            confidence: 0.0,
            elapsed_secs,
            error: Some(error.into()),
            timestamp: Utc::now(),
        }
    }

    /// Wire name of the event channel this payload belongs to.
    pub fn name(&self) -> &'static str {
        match self {
            AnalysisEvent::Progress { .. } => "progress",
            AnalysisEvent::Completed { .. } => "analysis-complete",
        }
    }

    /// Video this event refers to.
    pub fn video_id(&self) -> &VideoId {
        match self {
            AnalysisEvent::Progress { video_id, .. } => video_id,
            AnalysisEvent::Completed { video_id, .. } => video_id,
        }
    }
}
