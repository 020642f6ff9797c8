//! Sensitivity decision engine.
//!
//! A pure function over aggregate statistics; identical inputs always
//! produce an identical decision. The rules are ordered and the first
//! match wins, so the orchestration layer can swap in a model-based
//! classifier later without touching retries or the state machine.

use chrono::Utc;

use vmod_models::{Sensitivity, SensitivityDetails, SensitivityStatus, Thresholds};

use crate::aggregate::Aggregate;

/// Verdict produced by the decision engine for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub status: SensitivityStatus,
    pub reason: String,
    /// Confidence in [0, 1], rounded to 3 decimals
    pub confidence: f64,
    pub details: SensitivityDetails,
}

impl Decision {
    /// Convert into the persisted sensitivity record, stamping `checked_at`.
    pub fn into_sensitivity(self) -> Sensitivity {
        Sensitivity {
            status: self.status,
            reason: self.reason,
            confidence: self.confidence,
            checked_at: Some(Utc::now()),
            details: Some(self.details),
        }
    }
}

/// Map a run's aggregate statistics to a verdict.
pub fn decide(
    aggregate: &Aggregate,
    duration: f64,
    has_video_stream: bool,
    thresholds: &Thresholds,
) -> Decision {
    let details = SensitivityDetails {
        skin_ratio: aggregate.avg,
        max_skin_ratio: aggregate.max,
        frame_count: aggregate.frame_count,
        thresholds: *thresholds,
    };

    if !has_video_stream {
        return Decision {
            status: SensitivityStatus::Error,
            reason: "no video stream detected".to_string(),
            confidence: 0.0,
            details,
        };
    }

    if duration < thresholds.min_duration {
        return Decision {
            status: SensitivityStatus::Safe,
            reason: "video too short for analysis".to_string(),
            confidence: 0.5,
            details,
        };
    }

    let avg_hit = aggregate.avg > thresholds.avg_threshold;
    let max_hit = aggregate.max > thresholds.max_threshold;

    if avg_hit || max_hit {
        let reason = if avg_hit && max_hit {
            "high skin exposure detected consistently across frames"
        } else if avg_hit {
            "elevated average skin exposure across sampled frames"
        } else {
            "high skin exposure detected in individual frames"
        };
        return Decision {
            status: SensitivityStatus::Sensitive,
            reason: reason.to_string(),
            confidence: round3(f64::min(0.95, f64::max(aggregate.avg, aggregate.max))),
            details,
        };
    }

    Decision {
        status: SensitivityStatus::Safe,
        reason: "normal visual content detected".to_string(),
        confidence: round3(1.0 - f64::min(aggregate.avg, 0.5)),
        details,
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
