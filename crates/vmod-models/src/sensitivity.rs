//! Sensitivity verdict types.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification outcome assigned to a video's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum SensitivityStatus {
    /// No verdict recorded yet
    #[default]
    Pending,
    /// Content classified as safe
    Safe,
    /// Content classified as sensitive
    Sensitive,
    /// Analysis could not produce a usable verdict
    Error,
}

impl SensitivityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SensitivityStatus::Pending => "pending",
            SensitivityStatus::Safe => "safe",
            SensitivityStatus::Sensitive => "sensitive",
            SensitivityStatus::Error => "error",
        }
    }
}

impl fmt::Display for SensitivityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Threshold set the decision engine evaluated against.
///
/// Persisted alongside the verdict so results stay auditable after
/// configuration changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Thresholds {
    /// Minimum duration (seconds) required for a full analysis
    pub min_duration: f64,
    /// Average skin ratio above which content is sensitive
    pub avg_threshold: f64,
    /// Single-frame skin ratio above which content is sensitive
    pub max_threshold: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_duration: 5.0,
            avg_threshold: 0.3,
            max_threshold: 0.45,
        }
    }
}

/// Aggregate statistics backing a verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SensitivityDetails {
    /// Mean skin ratio over all sampled frames
    pub skin_ratio: f64,
    /// Maximum single-frame skin ratio
    pub max_skin_ratio: f64,
    /// Number of frames sampled
    pub frame_count: u32,
    pub thresholds: Thresholds,
}

/// Sensitivity verdict stored on the video record.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Sensitivity {
    #[serde(default)]
    pub status: SensitivityStatus,

    /// Human-readable explanation of the verdict
    #[serde(default)]
    pub reason: String,

    /// Confidence in [0, 1]
    #[serde(default)]
    pub confidence: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<SensitivityDetails>,
}

impl Default for Sensitivity {
    fn default() -> Self {
        Self {
            status: SensitivityStatus::Pending,
            reason: String::new(),
            confidence: 0.0,
            checked_at: None,
            details: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_pending() {
        let s = Sensitivity::default();
        assert_eq!(s.status, SensitivityStatus::Pending);
        assert_eq!(s.confidence, 0.0);
        assert!(s.checked_at.is_none());
    }

    #[test]
    fn test_details_wire_names() {
        let details = SensitivityDetails {
            skin_ratio: 0.1,
            max_skin_ratio: 0.2,
            frame_count: 8,
            thresholds: Thresholds::default(),
        };
        let json = serde_json::to_value(&details).unwrap();
        assert!(json.get("skinRatio").is_some());
        assert!(json.get("maxSkinRatio").is_some());
        assert!(json.get("frameCount").is_some());
    }
}
