//! Error types for the ranking engine.
//!
//! [`RankError`] aborts a whole ranking request. [`RowError`] describes why a
//! single data row was rejected; it is collected, never propagated.

use std::path::PathBuf;
use thiserror::Error;

use crate::segment::Segment;

pub type Result<T> = std::result::Result<T, RankError>;

#[derive(Debug, Error)]
pub enum RankError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("missing required column(s): {}", missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("column {0} appears more than once")]
    DuplicateColumn(String),

    #[error("invalid weight for {segment}: {value} (must be finite and >= 0)")]
    InvalidWeight { segment: Segment, value: f64 },

    #[error("invalid weights config: {0}")]
    Config(String),
}

impl RankError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RankError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Reason a data row was excluded from the ranking.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("missing identifier")]
    MissingIdentifier,

    #[error("missing value in column {0}")]
    MissingValue(Segment),

    #[error("non-numeric value in column {0}")]
    NonNumeric(Segment),

    #[error("negative value in column {0}")]
    Negative(Segment),

    #[error("malformed duration in column {0}")]
    MalformedDuration(Segment),

    #[error("unreadable row: {0}")]
    Unreadable(String),
}
