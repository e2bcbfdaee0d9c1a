//! Triathlon results ranking engine.
//!
//! Reads a CSV of athlete segment times, weights each segment and orders the
//! athletes by composite score (lower is better). Rows that fail validation are
//! reported alongside the ranking instead of aborting the run.

pub mod engine;
pub mod error;
pub mod loader;
pub mod output;
pub mod ranker;
pub mod record;
pub mod scorer;
pub mod segment;
pub mod stats;
pub mod weights;

pub use engine::{RankResult, rank, rank_reader};
pub use error::{RankError, RowError};
pub use ranker::RankingEntry;
pub use record::{AthleteRecord, RejectedRow};
pub use segment::Segment;
pub use weights::SegmentWeights;
