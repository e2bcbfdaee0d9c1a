//! The five timed legs of a triathlon result.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Segment {
    Swimming,
    Cycling,
    Running,
    Transition1,
    Transition2,
}

impl Segment {
    /// All segments in canonical column order.
    pub const ALL: [Segment; 5] = [
        Segment::Swimming,
        Segment::Cycling,
        Segment::Running,
        Segment::Transition1,
        Segment::Transition2,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Segment::Swimming => "Swimming",
            Segment::Cycling => "Cycling",
            Segment::Running => "Running",
            Segment::Transition1 => "Transition1",
            Segment::Transition2 => "Transition2",
        }
    }

    /// Matches a CSV header cell against the segment names, ignoring case and
    /// surrounding whitespace.
    pub fn from_header(header: &str) -> Option<Segment> {
        let header = header.trim();
        Segment::ALL
            .into_iter()
            .find(|s| s.name().eq_ignore_ascii_case(header))
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
