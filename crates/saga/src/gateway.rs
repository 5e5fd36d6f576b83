//! Ingress: external requests become properly initialized events.

use sagasim_core::{Event, Service, System, DEFAULT_RETRY_BUDGET};
use sagasim_queue::RoundQueue;
use sagasim_types::{Frame, Phase, Request, Round, ServiceId, TxId, TxState};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

/// Converts submitted requests into saga events and injects them into the
/// mailbox system.
///
/// The gateway owns its own round-gated inbox: a request submitted for
/// round R is invisible to `receive` until the clock reaches R.
pub struct RoundGateway {
    sys: Arc<System>,
    inbox: RoundQueue<Request>,
    tx_counter: AtomicU64,
}

impl RoundGateway {
    /// Create a gateway for a system.
    pub fn new(sys: Arc<System>) -> Self {
        let inbox = RoundQueue::new(sys.clock());
        Self {
            sys,
            inbox,
            tx_counter: AtomicU64::new(0),
        }
    }

    /// Enqueue an external request for ingress at `round`.
    pub fn submit(&self, request: Request, round: Round) {
        self.inbox.push(round, request);
    }

    /// Number of requests visible in the inbox right now.
    pub fn pending(&self) -> usize {
        self.inbox.len()
    }

    fn fresh_txid(&self) -> TxId {
        let n = self.tx_counter.fetch_add(1, Ordering::SeqCst) + 1;
        TxId::new(n.to_string())
    }

    fn admit(&self, request: Request) -> Event {
        let txid = request.txid.unwrap_or_else(|| self.fresh_txid());
        let mut event = Event::new(txid);
        event.from = ServiceId::Gateway;
        event.to = ServiceId::TxManager;
        event.round = self.sys.round().next();
        event.phase = Phase::Begin;
        event.state = TxState::None;
        event.remaining_retries = DEFAULT_RETRY_BUDGET;
        event.body = request.body;
        event.push_call(Frame::new(request.service, request.endpoint, 0));
        event
    }
}

impl Service for RoundGateway {
    fn id(&self) -> ServiceId {
        ServiceId::Gateway
    }

    /// Drain every request visible at the present round and forward each as
    /// a `Phase::Begin` event for round current + 1.
    fn receive(&self) {
        while let Ok(request) = self.inbox.pop() {
            let event = self.admit(request);
            info!(txid = %event.txid, service = %event.call_stack[0].service, "request admitted");
            self.sys.mailbox().send(event);
        }
    }
}
