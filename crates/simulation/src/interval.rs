//! Failure intervals.

use sagasim_types::{FailureKind, Round};
use serde::{Deserialize, Serialize};

/// A closed round range `[start, end]` during which a service suffers the
/// given failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub start: Round,
    pub end: Round,
    pub kind: FailureKind,
}

impl Interval {
    /// Create an interval.
    pub fn new(start: u64, end: u64, kind: FailureKind) -> Self {
        Self {
            start: Round(start),
            end: Round(end),
            kind,
        }
    }

    /// Whether `round` falls within this interval.
    pub fn contains(&self, round: Round) -> bool {
        self.start <= round && round <= self.end
    }

    /// Whether `other` overlaps or directly abuts this interval, so the
    /// two describe one continuous outage.
    pub fn touches(&self, other: &Interval) -> bool {
        other.start.get() <= self.end.get() + 1
    }
}
