//! The event envelope and its transition helpers.

use sagasim_types::{Body, Frame, Phase, Round, ServiceId, TxId, TxState};

/// Retry budget assigned to fresh events at gateway ingress.
pub const DEFAULT_RETRY_BUDGET: u32 = 5;

/// The unit of work exchanged between services.
///
/// Created by the gateway on ingress, mutated by the dispatcher at every
/// hop, terminated when the transaction manager marks the transaction
/// complete.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Stable transaction id, shared by all events of one saga.
    pub txid: TxId,
    /// Service that performed the last hop.
    pub from: ServiceId,
    /// Pending destination.
    pub to: ServiceId,
    /// Earliest round at which this event may be delivered.
    pub round: Round,
    /// Consecutive retries performed so far.
    pub current_retry: u32,
    /// Remaining retry budget; zero means the next failure is terminal.
    pub remaining_retries: u32,
    /// Handler chain to execute next.
    pub endpoint: String,
    /// Position within that chain.
    pub stage: usize,
    /// Where in the saga lifecycle this event sits.
    pub phase: Phase,
    /// Outcome annotation, written by handlers, read by the tx manager.
    pub state: TxState,
    /// Return addresses for synchronous call/return across services.
    pub call_stack: Vec<Frame>,
    /// Compensation addresses, one per executed forward hop.
    pub rollback_stack: Vec<Frame>,
    /// Handler-specific payload.
    pub body: Body,
}

impl Event {
    /// Create a blank event for a transaction.
    pub fn new(txid: TxId) -> Self {
        Self {
            txid,
            from: ServiceId::Gateway,
            to: ServiceId::Gateway,
            round: Round::ZERO,
            current_retry: 0,
            remaining_retries: DEFAULT_RETRY_BUDGET,
            endpoint: String::new(),
            stage: 0,
            phase: Phase::Begin,
            state: TxState::None,
            call_stack: Vec::new(),
            rollback_stack: Vec::new(),
            body: Body::new(),
        }
    }

    /// Advance the delivery round by one.
    pub fn advance(&mut self) {
        self.round = self.round.next();
    }

    /// Whether two events target the same `(to, endpoint, stage)` triple.
    ///
    /// This is the dispatcher's tie-break: equal means "continue within the
    /// chain", different means "call a child endpoint".
    pub fn same_destination(&self, other: &Event) -> bool {
        self.to == other.to && self.endpoint == other.endpoint && self.stage == other.stage
    }

    /// Push a return address onto the call stack.
    pub fn push_call(&mut self, frame: Frame) {
        self.call_stack.push(frame);
    }

    /// Pop the most recent return address.
    pub fn pop_call(&mut self) -> Option<Frame> {
        self.call_stack.pop()
    }

    /// Drop all pending return addresses.
    pub fn clear_call_stack(&mut self) {
        self.call_stack.clear();
    }

    /// Push a compensation address onto the rollback stack.
    pub fn push_rollback(&mut self, frame: Frame) {
        self.rollback_stack.push(frame);
    }

    /// Pop the most recent compensation address.
    pub fn pop_rollback(&mut self) -> Option<Frame> {
        self.rollback_stack.pop()
    }

    /// Vote to commit: record the resume point, annotate the outcome, and
    /// route to the transaction manager.
    pub fn commit(&mut self) {
        self.push_resume_frame();
        self.state = TxState::Commit;
        self.route_to_tx_manager();
    }

    /// Vote to abort. Same shape as [`commit`](Self::commit) with the
    /// opposite outcome.
    pub fn abort(&mut self) {
        self.push_resume_frame();
        self.state = TxState::Abort;
        self.route_to_tx_manager();
    }

    /// Terminate forward execution and hand the event to the transaction
    /// manager for final bookkeeping.
    pub fn end(&mut self) {
        self.push_resume_frame();
        self.phase = Phase::End;
        self.state = TxState::None;
        self.route_to_tx_manager();
    }

    /// Produce the next compensating event, or `None` when the rollback
    /// stack is exhausted.
    ///
    /// Each popped frame becomes an independent event addressed directly to
    /// the recorded service; the payload is carried along so compensation
    /// handlers can see what they are undoing.
    pub fn rollback(&mut self) -> Option<Event> {
        let frame = self.pop_rollback()?;
        let mut event = Event::new(self.txid.clone());
        event.round = self.round;
        event.phase = Phase::Rollback;
        event.to = frame.service;
        event.endpoint = frame.endpoint;
        event.stage = frame.stage;
        event.body = self.body.clone();
        Some(event)
    }

    /// Return control to the most recent caller, or to the transaction
    /// manager with `Phase::End` when the call stack is empty.
    pub fn return_to_caller(&mut self) {
        match self.pop_call() {
            Some(frame) => {
                self.to = frame.service;
                self.endpoint = frame.endpoint;
                self.stage = frame.stage;
            }
            None => {
                self.phase = Phase::End;
                self.route_to_tx_manager();
            }
        }
    }

    // Record the position right after the current one so a later
    // `return_to_caller` resumes where the transition left off.
    fn push_resume_frame(&mut self) {
        let frame = Frame::new(self.to, self.endpoint.clone(), self.stage + 1);
        self.push_call(frame);
    }

    fn route_to_tx_manager(&mut self) {
        self.to = ServiceId::TxManager;
        self.endpoint.clear();
        self.stage = 0;
    }
}

/// Compute the round at which a delayed retry should fire.
///
/// Exponential backoff: `current + 2^retry_count`, exponent capped at 5.
/// Returns `None` for a zero retry count, which callers treat as "not a
/// retry".
pub fn next_retry_round(current: Round, retry_count: u32) -> Option<Round> {
    if retry_count == 0 {
        return None;
    }
    let exp = retry_count.min(5);
    Some(Round(current.get() + (1u64 << exp)))
}
