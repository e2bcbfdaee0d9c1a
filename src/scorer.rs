//! Composite score computation.
//!
//! composite = Σ (duration_s × weight_s) over the five segments, rounded to
//! [`SCORE_DECIMALS`] digits so that ordering is stable across platforms.

use crate::record::AthleteRecord;
use crate::weights::SegmentWeights;

pub const SCORE_DECIMALS: i32 = 6;

/// Rounds a score to [`SCORE_DECIMALS`] decimal digits.
///
/// Values too large to scale are returned as is; at that magnitude the
/// fraction is already below f64 resolution.
pub fn round_score(value: f64) -> f64 {
    let factor = 10f64.powi(SCORE_DECIMALS);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / factor
}

/// Weighted sum of an athlete's durations. Lower is better.
pub fn composite_score(record: &AthleteRecord, weights: &SegmentWeights) -> f64 {
    let weighted_sum: f64 = record
        .durations
        .iter()
        .zip(weights.as_array().iter())
        .map(|(d, w)| d * w)
        .sum();

    round_score(weighted_sum)
}
