//! Shared data models for the video moderation backend.
//!
//! This crate provides Serde-serializable types for:
//! - Video records and their lifecycle status
//! - Sensitivity verdicts and classification details
//! - Analysis event payloads (progress / completion)

pub mod events;
pub mod format;
pub mod sensitivity;
pub mod video;

// Re-export common types
pub use events::AnalysisEvent;
pub use format::{format_duration, format_file_size};
pub use sensitivity::{Sensitivity, SensitivityDetails, SensitivityStatus, Thresholds};
pub use video::{RecordError, VideoId, VideoRecord, VideoStatus};
