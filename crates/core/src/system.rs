//! Shared system state: the clock, the mailboxes, and the failure table.

use crate::{EventQueue, ReportSink};
use indexmap::IndexMap;
use parking_lot::Mutex;
use sagasim_queue::{ClockHandle, RoundClock};
use sagasim_types::{FailureKind, Round, ServiceId};
use std::sync::Arc;

/// Everything the services share: the round clock, the event-queue system,
/// and the per-service failure status written by the round driver.
pub struct System {
    clock: RoundClock,
    mailbox: Arc<EventQueue>,
    status: Mutex<IndexMap<ServiceId, Option<FailureKind>>>,
}

impl System {
    /// Create a system with a fresh clock and mailboxes reporting into
    /// `sink`.
    pub fn new(sink: Box<dyn ReportSink>) -> Self {
        let clock = RoundClock::new();
        let mailbox = Arc::new(EventQueue::new(clock.handle(), sink));
        Self {
            clock,
            mailbox,
            status: Mutex::new(IndexMap::new()),
        }
    }

    /// The shared event-queue system.
    pub fn mailbox(&self) -> &Arc<EventQueue> {
        &self.mailbox
    }

    /// A read-only clock handle.
    pub fn clock(&self) -> ClockHandle {
        self.clock.handle()
    }

    /// Current round.
    pub fn round(&self) -> Round {
        self.clock.now()
    }

    /// Advance the simulation clock. Called by the round driver, once per
    /// tick; services never call this.
    pub fn advance_round(&self) -> Round {
        self.clock.advance()
    }

    /// Record a service's failure status for the current round.
    pub fn set_failure(&self, service: ServiceId, failure: Option<FailureKind>) {
        self.status.lock().insert(service, failure);
    }

    /// The failure currently injected for a service, if any.
    pub fn failure_of(&self, service: ServiceId) -> Option<FailureKind> {
        self.status.lock().get(&service).copied().flatten()
    }

    /// Whether a service is currently considered failed.
    pub fn is_failed(&self, service: ServiceId) -> bool {
        self.failure_of(service).is_some()
    }
}
