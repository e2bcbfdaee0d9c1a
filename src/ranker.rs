//! Ordering of scored athletes.

use serde::Serialize;

use crate::record::AthleteRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingEntry {
    /// 1-based position; ties get sequential ranks in input order.
    pub rank: usize,
    pub composite: f64,
    pub record: AthleteRecord,
}

/// Sorts scored records ascending by composite score.
///
/// The sort is stable, so equal scores keep their input order and still
/// receive distinct, sequential ranks.
pub fn rank_scored(scored: Vec<(AthleteRecord, f64)>) -> Vec<RankingEntry> {
    let mut scored = scored;
    scored.sort_by(|(_, a), (_, b)| a.total_cmp(b));

    scored
        .into_iter()
        .enumerate()
        .map(|(i, (record, composite))| RankingEntry {
            rank: i + 1,
            composite,
            record,
        })
        .collect()
}
