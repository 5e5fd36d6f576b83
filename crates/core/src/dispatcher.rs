//! Per-service endpoint registry and the hop-advance algorithm.

use crate::{Event, EventQueue, SagaError};
use indexmap::IndexMap;
use sagasim_types::{Frame, Phase, ServiceId};
use std::sync::Arc;
use tracing::{debug, warn};

/// One handler stage: a pure function from event to event.
///
/// Handlers must not assume they can jump stages themselves; the dispatcher
/// owns invocation order and stage bookkeeping.
pub type EventFn = Box<dyn Fn(Event) -> Result<Event, SagaError> + Send + Sync>;

/// An ordered chain of handler stages for one endpoint.
#[derive(Default)]
pub struct HandlerChain {
    stages: Vec<EventFn>,
}

impl HandlerChain {
    /// Append a stage. Builder-style so registration reads as a chain.
    pub fn add(
        &mut self,
        stage: impl Fn(Event) -> Result<Event, SagaError> + Send + Sync + 'static,
    ) -> &mut Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Whether no stage is registered.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    fn select(&self, stage: usize) -> Option<&EventFn> {
        self.stages.get(stage)
    }
}

/// Maps endpoint names to handler chains and drives stage advancement for
/// one service.
pub struct EventDispatcher {
    registry: IndexMap<String, HandlerChain>,
    mailbox: Arc<EventQueue>,
    service: ServiceId,
}

impl EventDispatcher {
    /// Create a dispatcher for `service`, forwarding into `mailbox`.
    pub fn new(mailbox: Arc<EventQueue>, service: ServiceId) -> Self {
        Self {
            registry: IndexMap::new(),
            mailbox,
            service,
        }
    }

    /// The service this dispatcher belongs to.
    pub fn service(&self) -> ServiceId {
        self.service
    }

    /// Return the (possibly fresh) mutable chain for an endpoint, for
    /// handler registration.
    pub fn focus(&mut self, endpoint: &str) -> &mut HandlerChain {
        self.registry.entry(endpoint.to_owned()).or_default()
    }

    /// Invoke stage `stage` of `endpoint`'s chain on `event`.
    pub fn enter(&self, endpoint: &str, stage: usize, event: Event) -> Result<Event, SagaError> {
        let chain = self
            .registry
            .get(endpoint)
            .ok_or_else(|| SagaError::WrongEndpoint(endpoint.to_owned()))?;
        let handler = chain.select(stage).ok_or_else(|| SagaError::WrongStage {
            endpoint: endpoint.to_owned(),
            stage,
        })?;
        handler(event)
    }

    /// The hop-advance algorithm.
    ///
    /// Runs the current stage, then decides between the two meanings a
    /// handler's output can have:
    ///
    /// - destination unchanged: multi-step local processing, so advance the
    ///   stage; a stage past the end of the chain returns to the caller;
    /// - destination changed: a call to a child endpoint, so push a return
    ///   frame and jump (unless the handler routed to the transaction
    ///   manager via `commit`/`abort`/`end`, which record their own frame).
    ///
    /// Every successful forward hop also pushes a rollback frame recording
    /// the stage that just executed, so an abort can compensate it later.
    ///
    /// Errors are logged and the event dropped; there is no retry at this
    /// layer.
    pub fn dispatch(&self, event: Event) {
        if event.phase == Phase::Rollback {
            self.compensate(event);
            return;
        }

        let original = event.clone();
        let mut next = match self.enter(&original.endpoint, original.stage, event) {
            Ok(next) => next,
            Err(error) => {
                warn!(service = %self.service, txid = %original.txid, %error, "dropping event");
                return;
            }
        };

        next.advance();
        next.from = self.service;
        next.push_rollback(Frame::new(
            original.to,
            original.endpoint.clone(),
            original.stage,
        ));

        if !next.same_destination(&original) {
            // commit/abort/end already pushed their resume frame
            if next.to != ServiceId::TxManager {
                next.push_call(Frame::new(
                    original.to,
                    original.endpoint.clone(),
                    original.stage + 1,
                ));
            }
        } else {
            next.stage += 1;
            let chain_len = self
                .registry
                .get(&original.endpoint)
                .map_or(0, HandlerChain::len);
            if next.stage == chain_len {
                next.return_to_caller();
            }
        }

        self.mailbox.send(next);
    }

    // A compensating event is terminal at this layer: run the recorded
    // stage so it can undo its effects, then drop the result.
    fn compensate(&self, event: Event) {
        let txid = event.txid.clone();
        let endpoint = event.endpoint.clone();
        let stage = event.stage;
        match self.enter(&endpoint, stage, event) {
            Ok(_) => {
                debug!(service = %self.service, %txid, %endpoint, stage, "compensation applied");
            }
            Err(error) => {
                warn!(service = %self.service, %txid, %endpoint, stage, %error, "compensation failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TraceSink;
    use sagasim_queue::RoundClock;
    use sagasim_types::{Round, TxId, TxState};

    fn mailbox(clock: &RoundClock) -> Arc<EventQueue> {
        Arc::new(EventQueue::new(clock.handle(), Box::<TraceSink>::default()))
    }

    fn processing_event(to: ServiceId, endpoint: &str, stage: usize) -> Event {
        let mut e = Event::new(TxId::new("1"));
        e.to = to;
        e.endpoint = endpoint.to_owned();
        e.stage = stage;
        e.phase = Phase::Processing;
        e.round = Round(1);
        e
    }

    fn drain(mq: &EventQueue, clock: &RoundClock, service: ServiceId) -> Event {
        for _ in 0..8 {
            clock.advance();
        }
        mq.pull(service).expect("event expected in mailbox")
    }

    #[test]
    fn test_same_destination_advances_stage() {
        let clock = RoundClock::new();
        let mq = mailbox(&clock);
        let mut d = EventDispatcher::new(Arc::clone(&mq), ServiceId::Order);
        d.focus("order")
            .add(Ok)
            .add(Ok)
            .add(Ok);

        d.dispatch(processing_event(ServiceId::Order, "order", 0));
        let e = drain(&mq, &clock, ServiceId::Order);
        assert_eq!(e.stage, 1);
        assert_eq!(e.from, ServiceId::Order);
        assert!(e.call_stack.is_empty());
        assert_eq!(e.rollback_stack.len(), 1);
    }

    #[test]
    fn test_exhausted_chain_returns_to_caller() {
        let clock = RoundClock::new();
        let mq = mailbox(&clock);
        let mut d = EventDispatcher::new(Arc::clone(&mq), ServiceId::Shipping);
        d.focus("shipping").add(Ok);

        let mut e = processing_event(ServiceId::Shipping, "shipping", 0);
        e.push_call(Frame::new(ServiceId::Order, "order", 1));
        d.dispatch(e);

        let resumed = drain(&mq, &clock, ServiceId::Order);
        assert_eq!(resumed.to, ServiceId::Order);
        assert_eq!(resumed.endpoint, "order");
        assert_eq!(resumed.stage, 1);
        assert!(resumed.call_stack.is_empty());
    }

    #[test]
    fn test_changed_destination_pushes_one_frame() {
        let clock = RoundClock::new();
        let mq = mailbox(&clock);
        let mut d = EventDispatcher::new(Arc::clone(&mq), ServiceId::Order);
        d.focus("order").add(|mut e: Event| {
            e.to = ServiceId::Customer;
            e.endpoint = "customer".to_owned();
            e.stage = 0;
            Ok(e)
        });

        d.dispatch(processing_event(ServiceId::Order, "order", 0));
        let e = drain(&mq, &clock, ServiceId::Customer);
        assert_eq!(e.stage, 0);
        assert_eq!(
            e.call_stack,
            vec![Frame::new(ServiceId::Order, "order", 1)]
        );
    }

    #[test]
    fn test_commit_transition_keeps_single_resume_frame() {
        let clock = RoundClock::new();
        let mq = mailbox(&clock);
        let mut d = EventDispatcher::new(Arc::clone(&mq), ServiceId::Payment);
        d.focus("payment").add(|mut e: Event| {
            e.commit();
            Ok(e)
        });

        d.dispatch(processing_event(ServiceId::Payment, "payment", 0));
        let e = drain(&mq, &clock, ServiceId::TxManager);
        assert_eq!(e.state, TxState::Commit);
        assert_eq!(
            e.call_stack,
            vec![Frame::new(ServiceId::Payment, "payment", 1)]
        );
    }

    #[test]
    fn test_wrong_stage_drops_event() {
        let clock = RoundClock::new();
        let mq = mailbox(&clock);
        let mut d = EventDispatcher::new(Arc::clone(&mq), ServiceId::Order);
        d.focus("order").add(Ok);

        d.dispatch(processing_event(ServiceId::Order, "order", 5));
        assert_eq!(mq.sent_count(), 0);
    }

    #[test]
    fn test_unknown_endpoint_drops_event() {
        let clock = RoundClock::new();
        let mq = mailbox(&clock);
        let d = EventDispatcher::new(Arc::clone(&mq), ServiceId::Order);

        d.dispatch(processing_event(ServiceId::Order, "missing", 0));
        assert_eq!(mq.sent_count(), 0);
    }

    #[test]
    fn test_rollback_event_is_terminal() {
        let clock = RoundClock::new();
        let mq = mailbox(&clock);
        let mut d = EventDispatcher::new(Arc::clone(&mq), ServiceId::Order);
        d.focus("order").add(Ok);

        let mut e = processing_event(ServiceId::Order, "order", 0);
        e.phase = Phase::Rollback;
        d.dispatch(e);
        assert_eq!(mq.sent_count(), 0);
    }
}
