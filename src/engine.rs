//! The ranking pipeline: load → parse → score → rank.
//!
//! [`rank`] is the single entry point a presentation layer needs. Each call is
//! independent; nothing is cached between calls.

use serde::Serialize;
use std::io::Read;
use std::path::Path;
use tracing::info;

use crate::error::Result;
use crate::loader::{RawTable, load_table, read_table};
use crate::ranker::{RankingEntry, rank_scored};
use crate::record::{RejectedRow, parse_rows};
use crate::scorer::composite_score;
use crate::weights::SegmentWeights;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RankResult {
    pub rankings: Vec<RankingEntry>,
    pub rejected: Vec<RejectedRow>,
}

impl RankResult {
    /// Number of data rows that went into this result.
    pub fn row_count(&self) -> usize {
        self.rankings.len() + self.rejected.len()
    }
}

/// Ranks the athletes in the CSV file at `path`.
///
/// # Errors
///
/// Fails if the file cannot be read or its header lacks a required column.
/// Malformed data rows never fail the call; they are listed in
/// [`RankResult::rejected`].
#[tracing::instrument(skip(path, weights), fields(path = %path.as_ref().display()))]
pub fn rank(path: impl AsRef<Path>, weights: &SegmentWeights) -> Result<RankResult> {
    let table = load_table(path)?;
    Ok(rank_table(&table, weights))
}

/// Same as [`rank`], reading CSV text from `reader`.
pub fn rank_reader<R: Read>(reader: R, weights: &SegmentWeights) -> Result<RankResult> {
    let table = read_table(reader)?;
    Ok(rank_table(&table, weights))
}

/// Ranks an already loaded table.
pub fn rank_table(table: &RawTable, weights: &SegmentWeights) -> RankResult {
    let (records, rejected) = parse_rows(table);

    let scored = records
        .into_iter()
        .map(|record| {
            let score = composite_score(&record, weights);
            (record, score)
        })
        .collect();

    let rankings = rank_scored(scored);

    info!(
        ranked = rankings.len(),
        rejected = rejected.len(),
        "Ranking complete"
    );

    RankResult { rankings, rejected }
}
