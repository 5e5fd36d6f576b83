//! The transaction-manager state machine.
//!
//! One instance per simulation. Keeps a progress table keyed by
//! transaction id (`None → InProgress → {Commit, Abort} → Complete`) and
//! decides, per incoming event, whether the saga proceeds, commits, or
//! unwinds through its rollback stack.

use indexmap::IndexMap;
use parking_lot::Mutex;
use sagasim_core::{Event, SagaError, Service, System};
use sagasim_types::{Phase, ServiceId, TxId, TxState};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Saga coordinator.
pub struct TxManager {
    sys: Arc<System>,
    // Retained for the whole run as simulation history; entries are never
    // removed.
    progress: Mutex<IndexMap<TxId, TxState>>,
    completed: Mutex<IndexMap<TxId, Event>>,
}

impl TxManager {
    /// Create the transaction manager for a system.
    pub fn new(sys: Arc<System>) -> Self {
        Self {
            sys,
            progress: Mutex::new(IndexMap::new()),
            completed: Mutex::new(IndexMap::new()),
        }
    }

    /// Current recorded state for a transaction.
    ///
    /// A never-seen id is initialized to `TxState::None` and that default
    /// is stored: a deliberate read-with-side-effect that avoids a
    /// separate initialization pass.
    pub fn state(&self, txid: &TxId) -> TxState {
        *self
            .progress
            .lock()
            .entry(txid.clone())
            .or_insert(TxState::None)
    }

    /// Mark a transaction aborted so its next event triggers compensation.
    ///
    /// Exposed for failure scenarios and tests; handlers reach the same
    /// effect through `Event::abort`.
    pub fn mark_abort(&self, txid: TxId) {
        self.set_state(txid, TxState::Abort);
    }

    /// The terminal event recorded when a transaction completed, if it has.
    pub fn completed_event(&self, txid: &TxId) -> Option<Event> {
        self.completed.lock().get(txid).cloned()
    }

    fn set_state(&self, txid: TxId, state: TxState) {
        self.progress.lock().insert(txid, state);
    }

    fn handle(&self, mut event: Event) {
        let mailbox = self.sys.mailbox();
        let state = self.state(&event.txid);
        match event.phase {
            Phase::Begin => {
                // failure detected before processing started
                if state == TxState::Abort {
                    self.finish(event);
                    return;
                }
                self.set_state(event.txid.clone(), TxState::InProgress);
                event.advance();
                event.return_to_caller();
                event.phase = Phase::Processing;
                event.state = TxState::None;
                event.from = ServiceId::TxManager;
                mailbox.send(event);
            }

            Phase::Processing => {
                if state == TxState::Abort {
                    self.unwind(event);
                    return;
                }
                if event.state == TxState::Commit {
                    self.set_state(event.txid.clone(), TxState::Commit);
                    event.advance();
                    event.return_to_caller();
                    event.from = ServiceId::TxManager;
                    mailbox.send(event);
                } else {
                    warn!(txid = %event.txid, state = %event.state, "unexpected state, dropping");
                }
            }

            Phase::End => {
                if state == TxState::Abort {
                    self.unwind(event);
                    return;
                }
                self.finish(event);
            }

            Phase::Rollback => {
                // compensation events are addressed to services, never here
                warn!(txid = %event.txid, phase = %event.phase, "unexpected phase, dropping");
            }
        }
    }

    // Concurrent, non-hierarchical unwinding: every rollback frame is
    // replayed as an independent event in one synchronous loop, so the
    // frames of this transaction compensate in exact reverse order even
    // though their completions are not awaited.
    fn unwind(&self, mut event: Event) {
        let mailbox = self.sys.mailbox();
        let mut frames = 0;
        while let Some(mut compensation) = event.rollback() {
            compensation.advance();
            compensation.from = ServiceId::TxManager;
            mailbox.send(compensation);
            frames += 1;
        }
        if frames == 0 {
            warn!(txid = %event.txid, error = %SagaError::NoMoreService, "nothing to compensate");
        }
        info!(txid = %event.txid, frames, "rollback issued");
        self.finish(event);
    }

    // Terminal bookkeeping: no further scheduling for this transaction.
    fn finish(&self, mut event: Event) {
        self.set_state(event.txid.clone(), TxState::Complete);
        event.clear_call_stack();
        event.rollback_stack.clear();
        debug!(txid = %event.txid, "transaction complete");
        self.completed.lock().insert(event.txid.clone(), event);
    }
}

impl Service for TxManager {
    fn id(&self) -> ServiceId {
        ServiceId::TxManager
    }

    fn receive(&self) {
        while let Ok(event) = self.sys.mailbox().pull(ServiceId::TxManager) {
            self.handle(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sagasim_core::TraceSink;
    use sagasim_types::{Frame, Round};

    fn system() -> Arc<System> {
        Arc::new(System::new(Box::<TraceSink>::default()))
    }

    fn begin_event(sys: &System, txid: &str) -> Event {
        let mut e = Event::new(TxId::new(txid));
        e.to = ServiceId::TxManager;
        e.round = sys.round();
        e.push_call(Frame::new(ServiceId::Payment, "payment", 0));
        e
    }

    fn deliver_all(sys: &System, tm: &TxManager) {
        sys.advance_round();
        tm.receive();
    }

    #[test]
    fn test_begin_acknowledges_and_resumes_caller() {
        let sys = system();
        let tm = TxManager::new(Arc::clone(&sys));

        sys.mailbox().send(begin_event(&sys, "1"));
        deliver_all(&sys, &tm);

        assert_eq!(tm.state(&TxId::new("1")), TxState::InProgress);
        for _ in 0..2 {
            sys.advance_round();
        }
        let forwarded = sys.mailbox().pull(ServiceId::Payment).unwrap();
        assert_eq!(forwarded.phase, Phase::Processing);
        assert_eq!(forwarded.state, TxState::None);
        assert_eq!(forwarded.endpoint, "payment");
        assert_eq!(forwarded.stage, 0);
        assert_eq!(forwarded.from, ServiceId::TxManager);
    }

    #[test]
    fn test_begin_on_aborted_tx_completes_without_forwarding() {
        let sys = system();
        let tm = TxManager::new(Arc::clone(&sys));
        tm.mark_abort(TxId::new("1"));

        let sent_before = sys.mailbox().sent_count();
        sys.mailbox().send(begin_event(&sys, "1"));
        deliver_all(&sys, &tm);

        assert_eq!(tm.state(&TxId::new("1")), TxState::Complete);
        assert_eq!(sys.mailbox().sent_count(), sent_before + 1);
    }

    #[test]
    fn test_processing_commit_records_and_resumes() {
        let sys = system();
        let tm = TxManager::new(Arc::clone(&sys));

        let mut e = Event::new(TxId::new("2"));
        e.to = ServiceId::TxManager;
        e.phase = Phase::Processing;
        e.state = TxState::Commit;
        e.round = sys.round();
        e.push_call(Frame::new(ServiceId::Payment, "payment", 2));
        sys.mailbox().send(e);
        deliver_all(&sys, &tm);

        assert_eq!(tm.state(&TxId::new("2")), TxState::Commit);
        for _ in 0..2 {
            sys.advance_round();
        }
        let resumed = sys.mailbox().pull(ServiceId::Payment).unwrap();
        assert_eq!(resumed.stage, 2);
        assert_eq!(resumed.phase, Phase::Processing);
    }

    #[test]
    fn test_processing_without_commit_is_dropped() {
        let sys = system();
        let tm = TxManager::new(Arc::clone(&sys));

        let mut e = Event::new(TxId::new("3"));
        e.to = ServiceId::TxManager;
        e.phase = Phase::Processing;
        e.round = sys.round();
        let sent_before = sys.mailbox().sent_count();
        sys.mailbox().send(e);
        deliver_all(&sys, &tm);

        // nothing forwarded beyond the original send, and no transition
        // recorded for the dropped event
        assert_eq!(sys.mailbox().sent_count(), sent_before + 1);
        assert_eq!(tm.state(&TxId::new("3")), TxState::None);
    }

    #[test]
    fn test_end_completes_and_clears_stacks() {
        let sys = system();
        let tm = TxManager::new(Arc::clone(&sys));

        let mut e = Event::new(TxId::new("4"));
        e.to = ServiceId::TxManager;
        e.phase = Phase::End;
        e.round = sys.round();
        e.push_rollback(Frame::new(ServiceId::Payment, "payment", 0));
        sys.mailbox().send(e);
        deliver_all(&sys, &tm);

        assert_eq!(tm.state(&TxId::new("4")), TxState::Complete);
        let terminal = tm.completed_event(&TxId::new("4")).unwrap();
        assert!(terminal.call_stack.is_empty());
        assert!(terminal.rollback_stack.is_empty());
    }

    #[test]
    fn test_aborted_tx_with_empty_rollback_stack_still_completes() {
        let sys = system();
        let tm = TxManager::new(Arc::clone(&sys));
        tm.mark_abort(TxId::new("6"));

        let mut e = Event::new(TxId::new("6"));
        e.to = ServiceId::TxManager;
        e.phase = Phase::Processing;
        e.round = sys.round();
        let sent_before = sys.mailbox().sent_count();
        sys.mailbox().send(e);
        deliver_all(&sys, &tm);

        // no compensation events went out, but the transaction terminates
        assert_eq!(sys.mailbox().sent_count(), sent_before + 1);
        assert_eq!(tm.state(&TxId::new("6")), TxState::Complete);
    }

    #[test]
    fn test_aborted_end_unwinds_rollback_stack_in_reverse() {
        let sys = system();
        let tm = TxManager::new(Arc::clone(&sys));
        tm.mark_abort(TxId::new("5"));

        let mut e = Event::new(TxId::new("5"));
        e.to = ServiceId::TxManager;
        e.phase = Phase::End;
        e.round = sys.round();
        e.push_rollback(Frame::new(ServiceId::Payment, "payment", 0));
        e.push_rollback(Frame::new(ServiceId::Order, "order", 0));
        e.push_rollback(Frame::new(ServiceId::Shipping, "shipping", 0));
        sys.mailbox().send(e);
        deliver_all(&sys, &tm);

        assert_eq!(tm.state(&TxId::new("5")), TxState::Complete);

        sys.advance_round();
        let first = sys.mailbox().pull(ServiceId::Shipping).unwrap();
        assert_eq!(first.phase, Phase::Rollback);
        let second = sys.mailbox().pull(ServiceId::Order).unwrap();
        assert_eq!(second.endpoint, "order");
        let third = sys.mailbox().pull(ServiceId::Payment).unwrap();
        assert_eq!(third.stage, 0);
    }
}
