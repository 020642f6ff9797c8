//! Video record model and lifecycle status.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::sensitivity::Sensitivity;

/// Unique identifier for a video record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct VideoId(pub String);

impl VideoId {
    /// Generate a new random video ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for VideoId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for VideoId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for VideoId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Video lifecycle status.
///
/// `uploaded -> processing -> {processed, failed}`; `processing` is entered
/// only through admission control, and `processed` is terminal unless the
/// record is explicitly reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum VideoStatus {
    /// Upload complete, no analysis run yet
    #[default]
    Uploaded,
    /// An analysis run is in flight
    Processing,
    /// Analysis finished and a verdict was recorded
    Processed,
    /// The last analysis run failed
    Failed,
}

impl VideoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoStatus::Uploaded => "uploaded",
            VideoStatus::Processing => "processing",
            VideoStatus::Processed => "processed",
            VideoStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for VideoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error recorded on a video record after a failed analysis run.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordError {
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl RecordError {
    pub fn now(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Persisted video record.
///
/// Created by the upload collaborator with `status = uploaded`; mutated only
/// by admission control and the pipeline stages. Deletion is out of scope.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    /// Unique video ID
    pub id: VideoId,

    /// Tenant this video belongs to
    pub tenant_id: String,

    /// User ID (owner)
    pub owner_id: String,

    /// Original filename as uploaded
    pub original_name: String,

    /// Storage locator of the media file
    pub stored_name: String,

    /// File size in bytes
    #[serde(default)]
    pub size: u64,

    /// Duration in seconds (0 when the probe at upload time failed)
    #[serde(default)]
    pub duration: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub codec: Option<String>,

    /// Lifecycle status
    #[serde(default)]
    pub status: VideoStatus,

    /// Relative path of the generated thumbnail, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,

    /// Set by admission control while a run is in flight
    #[serde(default)]
    pub analysis_requested: bool,

    /// Set once a verdict has been recorded; blocks further automatic runs
    #[serde(default)]
    pub analysis_done: bool,

    /// Number of analysis attempts so far
    #[serde(default)]
    pub analysis_retries: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_analysis_attempt: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_start_time: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_end_time: Option<DateTime<Utc>>,

    /// Last recorded run failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RecordError>,

    /// Classification verdict
    #[serde(default)]
    pub sensitivity: Sensitivity,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl VideoRecord {
    /// Create a fresh record for an uploaded file.
    pub fn new(
        tenant_id: impl Into<String>,
        owner_id: impl Into<String>,
        original_name: impl Into<String>,
        stored_name: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: VideoId::new(),
            tenant_id: tenant_id.into(),
            owner_id: owner_id.into(),
            original_name: original_name.into(),
            stored_name: stored_name.into(),
            size: 0,
            duration: 0.0,
            width: None,
            height: None,
            bitrate: None,
            codec: None,
            status: VideoStatus::Uploaded,
            thumbnail: None,
            analysis_requested: false,
            analysis_done: false,
            analysis_retries: 0,
            last_analysis_attempt: None,
            processing_start_time: None,
            processing_end_time: None,
            error: None,
            sensitivity: Sensitivity::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Mark the record as admitted for a run.
    pub fn begin_processing(&mut self) {
        self.analysis_requested = true;
        self.status = VideoStatus::Processing;
        self.processing_start_time = Some(Utc::now());
        self.touch();
    }

    /// Record a verdict and close the run.
    pub fn complete_with(&mut self, sensitivity: Sensitivity) {
        self.sensitivity = sensitivity;
        self.status = VideoStatus::Processed;
        self.analysis_done = true;
        self.analysis_requested = false;
        self.processing_end_time = Some(Utc::now());
        self.touch();
    }

    /// Record a run failure; the record stays eligible for re-trigger
    /// until the retry budget is exhausted.
    pub fn fail_with(&mut self, message: impl Into<String>) {
        self.error = Some(RecordError::now(message));
        self.status = VideoStatus::Failed;
        self.analysis_requested = false;
        self.processing_end_time = Some(Utc::now());
        self.touch();
    }

    /// Record a terminal failure once the retry budget is exhausted.
    /// Blocks further automatic runs; only an explicit reset reopens it.
    pub fn fail_terminal(&mut self, sensitivity: Sensitivity) {
        self.sensitivity = sensitivity;
        self.status = VideoStatus::Failed;
        self.analysis_done = true;
        self.analysis_requested = false;
        self.processing_end_time = Some(Utc::now());
        self.touch();
    }

    /// Explicit external reset back to `uploaded` / `pending`.
    pub fn reset_analysis(&mut self) {
        self.status = VideoStatus::Uploaded;
        self.sensitivity = Sensitivity::default();
        self.analysis_requested = false;
        self.analysis_done = false;
        self.analysis_retries = 0;
        self.error = None;
        self.processing_start_time = None;
        self.processing_end_time = None;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Human-readable duration, e.g. `2m 5s`.
    pub fn duration_formatted(&self) -> String {
        crate::format::format_duration(self.duration)
    }

    /// Human-readable file size, e.g. `1.5 MB`.
    pub fn size_formatted(&self) -> String {
        crate::format::format_file_size(self.size)
    }

    /// Elapsed processing time in seconds, when both bounds are recorded.
    pub fn processing_elapsed_secs(&self) -> Option<f64> {
        let start = self.processing_start_time?;
        let end = self.processing_end_time?;
        Some((end - start).num_milliseconds() as f64 / 1000.0)
    }
}
