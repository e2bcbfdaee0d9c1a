//! Per-segment weights applied to athlete durations.
//!
//! Weights are validated on construction (finite, non-negative) and do not
//! have to sum to 1.0: the composite score is a plain weighted sum.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::error::{RankError, Result};
use crate::segment::Segment;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SegmentWeights {
    swimming: f64,
    cycling: f64,
    running: f64,
    transition1: f64,
    transition2: f64,
}

impl Default for SegmentWeights {
    fn default() -> Self {
        Self {
            swimming: 0.2,
            cycling: 0.3,
            running: 0.2,
            transition1: 0.1,
            transition2: 0.1,
        }
    }
}

/// On-disk shape of a weights file. Keys left out keep their current value.
///
/// ```json
/// { "swimming": 0.25, "cycling": 0.35, "running": 0.25 }
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct WeightsFile {
    swimming: Option<f64>,
    cycling: Option<f64>,
    running: Option<f64>,
    transition1: Option<f64>,
    transition2: Option<f64>,
}

impl SegmentWeights {
    pub fn new(
        swimming: f64,
        cycling: f64,
        running: f64,
        transition1: f64,
        transition2: f64,
    ) -> Result<Self> {
        Self::from_array([swimming, cycling, running, transition1, transition2])
    }

    /// Every weight set to zero. Ranking with these preserves input order.
    pub fn zero() -> Self {
        Self {
            swimming: 0.0,
            cycling: 0.0,
            running: 0.0,
            transition1: 0.0,
            transition2: 0.0,
        }
    }

    /// Builds weights from an array in canonical segment order.
    pub fn from_array(values: [f64; 5]) -> Result<Self> {
        for (segment, value) in Segment::ALL.into_iter().zip(values) {
            check(segment, value)?;
        }
        let [swimming, cycling, running, transition1, transition2] = values;
        Ok(Self {
            swimming,
            cycling,
            running,
            transition1,
            transition2,
        })
    }

    pub fn get(&self, segment: Segment) -> f64 {
        match segment {
            Segment::Swimming => self.swimming,
            Segment::Cycling => self.cycling,
            Segment::Running => self.running,
            Segment::Transition1 => self.transition1,
            Segment::Transition2 => self.transition2,
        }
    }

    /// Returns a copy with one weight replaced.
    pub fn with(mut self, segment: Segment, value: f64) -> Result<Self> {
        check(segment, value)?;
        match segment {
            Segment::Swimming => self.swimming = value,
            Segment::Cycling => self.cycling = value,
            Segment::Running => self.running = value,
            Segment::Transition1 => self.transition1 = value,
            Segment::Transition2 => self.transition2 = value,
        }
        Ok(self)
    }

    pub fn as_array(&self) -> [f64; 5] {
        Segment::ALL.map(|s| self.get(s))
    }

    pub fn sum(&self) -> f64 {
        self.as_array().iter().sum()
    }

    /// Loads a JSON weights file, starting from the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| RankError::io(path, e))?;
        let weights = Self::default().merge_json(&content)?;
        debug!(path = %path.display(), ?weights, "Weights loaded");
        Ok(weights)
    }

    /// Applies the keys present in a JSON weights document on top of `self`.
    pub fn merge_json(self, json: &str) -> Result<Self> {
        let file: WeightsFile =
            serde_json::from_str(json).map_err(|e| RankError::Config(e.to_string()))?;

        let overrides = [
            (Segment::Swimming, file.swimming),
            (Segment::Cycling, file.cycling),
            (Segment::Running, file.running),
            (Segment::Transition1, file.transition1),
            (Segment::Transition2, file.transition2),
        ];

        overrides
            .into_iter()
            .try_fold(self, |acc, (segment, value)| match value {
                Some(v) => acc.with(segment, v),
                None => Ok(acc),
            })
    }
}

fn check(segment: Segment, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(RankError::InvalidWeight { segment, value })
    }
}
