//! Aggregation of per-frame skin ratios.

use crate::skin::round4;

/// Aggregate statistics over all frame samples of one run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aggregate {
    /// Mean of per-frame skin ratios
    pub avg: f64,
    /// Maximum per-frame skin ratio
    pub max: f64,
    /// Number of frames that contributed
    pub frame_count: u32,
}

impl Aggregate {
    /// Aggregate a run's per-frame ratios, rounding to 4 decimals.
    pub fn from_ratios(ratios: &[f64]) -> Self {
        if ratios.is_empty() {
            return Self {
                avg: 0.0,
                max: 0.0,
                frame_count: 0,
            };
        }

        let sum: f64 = ratios.iter().sum();
        let max = ratios.iter().cloned().fold(0.0, f64::max);

        Self {
            avg: round4(sum / ratios.len() as f64),
            max: round4(max),
            frame_count: ratios.len() as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_mean_and_max() {
        let agg = Aggregate::from_ratios(&[0.1, 0.2, 0.6]);
        assert_eq!(agg.avg, 0.3);
        assert_eq!(agg.max, 0.6);
        assert_eq!(agg.frame_count, 3);
    }

    #[test]
    fn test_aggregate_rounds_to_four_decimals() {
        let agg = Aggregate::from_ratios(&[1.0 / 3.0, 1.0 / 3.0]);
        assert_eq!(agg.avg, 0.3333);
        assert_eq!(agg.max, 0.3333);
    }

    #[test]
    fn test_empty_input_yields_zeros() {
        let agg = Aggregate::from_ratios(&[]);
        assert_eq!(agg.avg, 0.0);
        assert_eq!(agg.max, 0.0);
        assert_eq!(agg.frame_count, 0);
    }
}
