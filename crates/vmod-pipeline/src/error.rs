//! Pipeline error types.

use thiserror::Error;

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Hard failure of an analysis run, caught by the retry governor.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Media error: {0}")]
    Media(#[from] vmod_media::MediaError),

    #[error("Store error: {0}")]
    Store(#[from] vmod_store::StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Synchronous rejection of an analysis trigger; no job starts.
#[derive(Debug, Error)]
pub enum AdmissionError {
    #[error("Video not found")]
    NotFound,

    #[error("Video already analyzed")]
    AlreadyAnalyzed,

    #[error("Analysis already in progress")]
    AlreadyInProgress,

    #[error("Store error: {0}")]
    Store(#[from] vmod_store::StoreError),
}
