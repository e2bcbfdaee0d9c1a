use serde::Serialize;

use crate::engine::RankResult;
use crate::segment::Segment;

/// Field-wide figures for one ranking run.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct RankSummary {
    pub athletes: usize,
    pub rejected: usize,

    // composite scores
    pub best: Option<f64>,
    pub worst: Option<f64>,
    pub mean: f64,
    pub stddev: f64,

    /// Mean seconds per segment over ranked athletes, in [`Segment::ALL`] order.
    pub segment_means: [f64; 5],
}

impl RankSummary {
    pub fn from_result(result: &RankResult) -> Self {
        let scores: Vec<f64> = result.rankings.iter().map(|e| e.composite).collect();
        let avg = mean(&scores);

        let mut segment_means = [0.0; 5];
        for segment in Segment::ALL {
            let series: Vec<f64> = result
                .rankings
                .iter()
                .map(|e| e.record.duration(segment))
                .collect();
            segment_means[segment.index()] = mean(&series);
        }

        RankSummary {
            athletes: result.rankings.len(),
            rejected: result.rejected.len(),
            best: result.rankings.first().map(|e| e.composite),
            worst: result.rankings.last().map(|e| e.composite),
            mean: avg,
            stddev: stddev(&scores, avg),
            segment_means,
        }
    }

    pub fn segment_mean(&self, segment: Segment) -> f64 {
        self.segment_means[segment.index()]
    }

    /// Percentage of data rows that were rejected.
    pub fn rejected_pct(&self) -> f64 {
        pct(self.rejected, self.athletes + self.rejected)
    }
}

pub fn pct(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (part as f64 / total as f64) * 100.0
    }
}

/// Average of a series of scores or durations; an empty field averages to 0.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Spread of composite scores around `mean`, treating the ranked athletes as
/// the whole population. An empty field has no spread.
pub fn stddev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;

    variance.sqrt()
}
