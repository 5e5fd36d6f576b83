//! The shared simulation clock.
//!
//! One [`RoundClock`] per simulation, owned by the round driver; everything
//! else sees a [`ClockHandle`], which can only read. This replaces the
//! "shared pointer to a mutable integer" shape: advancing the clock is a
//! single owner-controlled operation, observation is an atomic load.

use sagasim_types::Round;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Owner side of the simulation clock.
#[derive(Debug)]
pub struct RoundClock {
    shared: Arc<AtomicU64>,
}

impl RoundClock {
    /// Create a clock at round zero.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Advance to the next round and return it.
    ///
    /// Only the round driver calls this, exactly once per tick.
    pub fn advance(&self) -> Round {
        Round(self.shared.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Current round.
    pub fn now(&self) -> Round {
        Round(self.shared.load(Ordering::SeqCst))
    }

    /// Create a read-only handle sharing this clock.
    pub fn handle(&self) -> ClockHandle {
        ClockHandle {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl Default for RoundClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only view of the simulation clock, held by every gated queue.
#[derive(Debug, Clone)]
pub struct ClockHandle {
    shared: Arc<AtomicU64>,
}

impl ClockHandle {
    /// Current round.
    pub fn now(&self) -> Round {
        Round(self.shared.load(Ordering::SeqCst))
    }
}
