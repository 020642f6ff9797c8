//! FFmpeg CLI wrappers for the video moderation pipeline.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building with an optional timeout
//! - Media metadata probing via ffprobe
//! - Evenly spaced frame sampling at reduced resolution
//! - Thumbnail generation
//! - The `MediaEngine` trait seam consumed by the pipeline

pub mod command;
pub mod engine;
pub mod error;
pub mod frames;
pub mod probe;
pub mod thumbnail;

pub use command::{FfmpegCommand, FfmpegRunner};
pub use engine::{FfmpegEngine, MediaEngine};
pub use error::{MediaError, MediaResult};
pub use frames::{extract_frames, plan_timestamps};
pub use probe::{probe_media, MediaInfo};
pub use thumbnail::{generate_thumbnail, thumbnail_timestamp, THUMBNAIL_SCALE_WIDTH};
