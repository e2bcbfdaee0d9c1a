//! Conversion of raw CSV rows into validated athlete records.

use serde::Serialize;
use tracing::warn;

use crate::error::RowError;
use crate::loader::{RawRow, RawTable};
use crate::segment::Segment;

/// A validated result row: an identifier and five durations in seconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AthleteRecord {
    pub id: String,
    /// Seconds per segment, in [`Segment::ALL`] order.
    pub durations: [f64; 5],
}

impl AthleteRecord {
    pub fn duration(&self, segment: Segment) -> f64 {
        self.durations[segment.index()]
    }

    /// Unweighted sum of all segments.
    pub fn total(&self) -> f64 {
        self.durations.iter().sum()
    }
}

/// A data row excluded from the ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedRow {
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationError {
    Empty,
    NonNumeric,
    Negative,
    Malformed,
}

impl DurationError {
    fn in_column(self, segment: Segment) -> RowError {
        match self {
            DurationError::Empty => RowError::MissingValue(segment),
            DurationError::NonNumeric => RowError::NonNumeric(segment),
            DurationError::Negative => RowError::Negative(segment),
            DurationError::Malformed => RowError::MalformedDuration(segment),
        }
    }
}

/// Parses a segment time into seconds.
///
/// Accepts plain seconds (`"1834.5"`), `"MM:SS"` and `"H:MM:SS"`. In the
/// colon forms only the last component may carry a fraction and every
/// component after the first must be below 60.
pub fn parse_duration(text: &str) -> Result<f64, DurationError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(DurationError::Empty);
    }

    if !text.contains(':') {
        return parse_seconds(text);
    }

    let parts: Vec<&str> = text.split(':').map(str::trim).collect();
    if parts.len() > 3 {
        return Err(DurationError::Malformed);
    }
    if parts[0].starts_with('-') {
        return Err(DurationError::Negative);
    }

    let (last, leading) = match parts.split_last() {
        Some(split) => split,
        None => return Err(DurationError::Malformed),
    };

    let mut total = 0.0;
    for (i, part) in leading.iter().enumerate() {
        let value = parse_whole(part)?;
        if i > 0 && value >= 60 {
            return Err(DurationError::Malformed);
        }
        total = total * 60.0 + value as f64;
    }

    let seconds = parse_seconds(last).map_err(|e| match e {
        DurationError::Empty | DurationError::Negative => DurationError::Malformed,
        other => other,
    })?;
    if seconds >= 60.0 {
        return Err(DurationError::Malformed);
    }

    Ok(total * 60.0 + seconds)
}

fn parse_seconds(text: &str) -> Result<f64, DurationError> {
    if text.is_empty() {
        return Err(DurationError::Empty);
    }
    let value: f64 = text.parse().map_err(|_| DurationError::NonNumeric)?;
    if !value.is_finite() {
        return Err(DurationError::NonNumeric);
    }
    if value < 0.0 {
        return Err(DurationError::Negative);
    }
    // "-0" parses to -0.0
    Ok(value.abs())
}

fn parse_whole(text: &str) -> Result<u64, DurationError> {
    if text.is_empty() {
        return Err(DurationError::Malformed);
    }
    if !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(if text.parse::<f64>().is_ok() {
            DurationError::Malformed
        } else {
            DurationError::NonNumeric
        });
    }
    text.parse().map_err(|_| DurationError::Malformed)
}

/// Validates one raw row. Segments are checked in canonical order and the
/// first failure wins.
pub fn parse_row(row: &RawRow, id_column: &str) -> Result<AthleteRecord, RowError> {
    if let Some(err) = &row.error {
        return Err(RowError::Unreadable(err.clone()));
    }

    let id = row
        .cells
        .get(id_column)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .ok_or(RowError::MissingIdentifier)?;

    let mut durations = [0.0; 5];
    for segment in Segment::ALL {
        let cell = row
            .cells
            .get(segment.name())
            .ok_or(RowError::MissingValue(segment))?;
        durations[segment.index()] = parse_duration(cell).map_err(|e| e.in_column(segment))?;
    }

    Ok(AthleteRecord {
        id: id.to_string(),
        durations,
    })
}

/// Splits a table into accepted records and rejected rows, both in input order.
pub fn parse_rows(table: &RawTable) -> (Vec<AthleteRecord>, Vec<RejectedRow>) {
    let mut records = Vec::with_capacity(table.rows.len());
    let mut rejected = Vec::new();

    for row in &table.rows {
        match parse_row(row, &table.id_column) {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!(row = row.index, reason = %e, "Row rejected");
                rejected.push(RejectedRow {
                    index: row.index,
                    reason: e.to_string(),
                });
            }
        }
    }

    (records, rejected)
}
