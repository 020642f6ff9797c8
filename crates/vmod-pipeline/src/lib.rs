//! Sensitivity analysis orchestration.
//!
//! This crate wires the media layer, classifier and record store into an
//! asynchronous pipeline:
//! - `Analyzer` admits triggers, enforces at most one run per video and
//!   spawns each admitted run as a detached task
//! - the retry governor caps attempts and records terminal failures
//! - progress and completion are broadcast fire-and-forget
//!
//! Callers observe outcomes through the record store and the event channel,
//! never through the trigger's return value.

pub mod analyzer;
pub mod config;
pub mod error;
mod governor;
mod pipeline;

pub use analyzer::Analyzer;
pub use config::AnalysisConfig;
pub use error::{AdmissionError, PipelineError, PipelineResult};
