//! Rule-based visual sensitivity analysis.
//!
//! This crate provides the pure half of the pipeline:
//! - Skin-pixel predicates and per-frame skin ratios (`skin`)
//! - Per-run aggregation (`aggregate`)
//! - The ordered-rule decision engine (`decision`)
//!
//! Nothing here performs I/O beyond decoding a raster file; orchestration,
//! retries and persistence live in `vmod-pipeline`.

pub mod aggregate;
pub mod decision;
pub mod error;
pub mod skin;

pub use aggregate::Aggregate;
pub use decision::{decide, Decision};
pub use error::{AnalysisError, AnalysisResult};
pub use skin::{
    is_skin_pixel, is_skin_rgb, is_skin_ycbcr, sampling_stride, skin_ratio, skin_ratio_file,
    MAX_SAMPLED_PIXELS,
};
