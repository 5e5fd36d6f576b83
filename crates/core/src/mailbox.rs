//! The per-service mailbox system.

use crate::{next_retry_round, Event, ReportSink, SagaError};
use indexmap::IndexMap;
use sagasim_queue::{ClockHandle, QueueError, RoundQueue};
use sagasim_types::ServiceId;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::warn;

/// One round-gated queue per mailbox-owning service.
///
/// `send` is the single funnel for inter-service mail: it invokes the
/// report sink, then enqueues the event keyed by its delivery round.
pub struct EventQueue {
    clock: ClockHandle,
    queues: IndexMap<ServiceId, RoundQueue<Event>>,
    sink: Box<dyn ReportSink>,
    sent: AtomicU64,
}

impl EventQueue {
    /// Create mailboxes for every mailbox-owning service.
    pub fn new(clock: ClockHandle, sink: Box<dyn ReportSink>) -> Self {
        let queues = ServiceId::MAILBOX_SERVICES
            .into_iter()
            .map(|service| (service, RoundQueue::new(clock.clone())))
            .collect();
        Self {
            clock,
            queues,
            sink,
            sent: AtomicU64::new(0),
        }
    }

    /// Enqueue an event for its destination mailbox at its delivery round.
    ///
    /// An event addressed to a service without a mailbox is logged and
    /// dropped; the transaction it belongs to times out via retry
    /// exhaustion rather than failing the simulation.
    pub fn send(&self, event: Event) {
        let Some(queue) = self.queues.get(&event.to) else {
            warn!(to = %event.to, txid = %event.txid, "no mailbox for destination, dropping");
            return;
        };
        self.sink.record(event.to, self.clock.now(), &event);
        self.sent.fetch_add(1, Ordering::Relaxed);
        queue.push(event.round, event);
    }

    /// Dequeue the next event due for a service.
    pub fn pull(&self, service: ServiceId) -> Result<Event, QueueError> {
        match self.queues.get(&service) {
            Some(queue) => queue.pop(),
            None => Err(QueueError::Empty),
        }
    }

    /// Re-enqueue an event after a transient failure, with exponential
    /// backoff. Exhausting the budget is terminal: the event is logged and
    /// dropped.
    pub fn send_retry(&self, mut event: Event) {
        event.current_retry += 1;
        event.remaining_retries = event.remaining_retries.saturating_sub(1);
        if event.remaining_retries == 0 {
            warn!(
                txid = %event.txid,
                error = %SagaError::TooManyRetries(event.txid.clone()),
                "dropping event",
            );
            return;
        }
        if let Some(round) = next_retry_round(event.round, event.current_retry) {
            event.round = round;
            self.send(event);
        }
    }

    /// Number of events visible right now in a service's mailbox.
    pub fn backlog(&self, service: ServiceId) -> usize {
        self.queues.get(&service).map_or(0, RoundQueue::len)
    }

    /// Total events accepted by `send` since construction.
    pub fn sent_count(&self) -> u64 {
        self.sent.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TraceSink;
    use sagasim_queue::RoundClock;
    use sagasim_types::{Round, TxId};

    fn mailbox(clock: &RoundClock) -> EventQueue {
        EventQueue::new(clock.handle(), Box::<TraceSink>::default())
    }

    fn event_for(service: ServiceId, round: Round) -> Event {
        let mut e = Event::new(TxId::new("1"));
        e.to = service;
        e.round = round;
        e
    }

    #[test]
    fn test_send_pull_respects_gating() {
        let clock = RoundClock::new();
        let mq = mailbox(&clock);

        mq.send(event_for(ServiceId::Order, Round(2)));
        assert_eq!(mq.pull(ServiceId::Order), Err(QueueError::Empty));

        clock.advance();
        clock.advance();
        let got = mq.pull(ServiceId::Order).unwrap();
        assert_eq!(got.to, ServiceId::Order);
        assert_eq!(mq.pull(ServiceId::Order), Err(QueueError::Empty));
    }

    #[test]
    fn test_send_to_gateway_is_dropped() {
        let clock = RoundClock::new();
        let mq = mailbox(&clock);

        mq.send(event_for(ServiceId::Gateway, Round(0)));
        assert_eq!(mq.sent_count(), 0);
    }

    #[test]
    fn test_retry_backoff_and_exhaustion() {
        let clock = RoundClock::new();
        let mq = mailbox(&clock);

        let mut e = event_for(ServiceId::Payment, Round(4));
        e.remaining_retries = 2;
        mq.send_retry(e);
        assert_eq!(mq.sent_count(), 1);

        // delivery round moved out by 2^1
        for _ in 0..6 {
            clock.advance();
        }
        let retried = mq.pull(ServiceId::Payment).unwrap();
        assert_eq!(retried.round, Round(6));
        assert_eq!(retried.current_retry, 1);
        assert_eq!(retried.remaining_retries, 1);

        // budget hits zero: dropped, not re-enqueued
        mq.send_retry(retried);
        assert_eq!(mq.sent_count(), 1);
        assert_eq!(mq.backlog(ServiceId::Payment), 0);
    }
}
