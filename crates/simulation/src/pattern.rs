//! Failure patterns: which service is down when.

use crate::Interval;
use indexmap::IndexMap;
use sagasim_types::{FailureKind, Round, ServiceId};

/// Source of per-service failure status, queried once per service per round.
///
/// Queries for a given service must be issued with non-decreasing rounds
/// across the simulation; implementations may keep forward-only cursors.
pub trait FailurePattern: Send {
    /// Prepare the pattern for querying. Called once before the first round.
    fn init(&mut self);

    /// The failure injected for `service` at `round`, if any.
    fn get(&mut self, service: ServiceId, round: Round) -> Option<FailureKind>;
}

/// A pattern built from explicit per-service interval lists.
///
/// `init` sorts each service's intervals by start and merges overlapping or
/// adjacent ones, so queries walk an ordered, disjoint list with a
/// monotonically advancing cursor.
#[derive(Debug, Clone, Default)]
pub struct DefinedIntervalPattern {
    intervals: IndexMap<ServiceId, Vec<Interval>>,
    cursors: IndexMap<ServiceId, usize>,
}

impl DefinedIntervalPattern {
    /// Create an empty pattern (no failures ever).
    pub fn new() -> Self {
        Self::default()
    }

    /// Add intervals for a service. May be unordered and overlapping;
    /// `init` normalizes them.
    pub fn with_service(mut self, service: ServiceId, intervals: Vec<Interval>) -> Self {
        self.intervals.entry(service).or_default().extend(intervals);
        self
    }

    /// The normalized interval list for a service (meaningful after
    /// `init`).
    pub fn intervals_for(&self, service: ServiceId) -> &[Interval] {
        self.intervals
            .get(&service)
            .map_or(&[], Vec::as_slice)
    }

    fn merge(intervals: &mut Vec<Interval>) {
        if intervals.is_empty() {
            return;
        }
        intervals.sort_by_key(|interval| interval.start);

        let mut merged: Vec<Interval> = Vec::with_capacity(intervals.len());
        let mut current = intervals[0];
        for next in &intervals[1..] {
            if current.touches(next) {
                current.end = current.end.max(next.end);
            } else {
                merged.push(current);
                current = *next;
            }
        }
        merged.push(current);
        *intervals = merged;
    }
}

impl FailurePattern for DefinedIntervalPattern {
    fn init(&mut self) {
        for intervals in self.intervals.values_mut() {
            Self::merge(intervals);
        }
        self.cursors = self
            .intervals
            .keys()
            .map(|service| (*service, 0))
            .collect();
    }

    fn get(&mut self, service: ServiceId, round: Round) -> Option<FailureKind> {
        let intervals = self.intervals.get(&service)?;
        let cursor = self.cursors.entry(service).or_insert(0);
        let interval = intervals.get(*cursor)?;
        if interval.contains(round) {
            return Some(interval.kind);
        }
        if round < interval.start {
            return None;
        }
        // past the interval's end: advance once; the caller queries again
        // next round
        *cursor += 1;
        None
    }
}
