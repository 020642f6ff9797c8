//! Error types for analysis operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Failed to decode frame {path}: {source}")]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },
}
