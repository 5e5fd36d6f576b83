//! Order service: fans out to shipping and customer.

use indexmap::IndexMap;
use parking_lot::Mutex;
use sagasim_core::{Event, EventDispatcher, Service, System};
use sagasim_types::{Phase, ServiceId, TxId};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OrderStatus {
    Paid,
    Cancelled,
}

/// Keeps the paid/cancelled status per transaction and calls shipping and
/// customer in sequence.
pub struct OrderService {
    sys: Arc<System>,
    dispatcher: EventDispatcher,
    statuses: Arc<Mutex<IndexMap<TxId, OrderStatus>>>,
}

impl OrderService {
    /// Create the service and register its handler chain.
    pub fn new(sys: Arc<System>) -> Self {
        let mut dispatcher = EventDispatcher::new(Arc::clone(sys.mailbox()), ServiceId::Order);
        let statuses: Arc<Mutex<IndexMap<TxId, OrderStatus>>> = Arc::default();

        let mark_statuses = Arc::clone(&statuses);
        dispatcher
            .focus("order")
            // stage 0: mark the order paid, then call shipping
            .add(move |mut e: Event| {
                if e.phase == Phase::Rollback {
                    mark_statuses.lock().insert(e.txid.clone(), OrderStatus::Cancelled);
                    debug!(txid = %e.txid, "order cancelled");
                    return Ok(e);
                }
                mark_statuses.lock().insert(e.txid.clone(), OrderStatus::Paid);
                e.to = ServiceId::Shipping;
                e.endpoint = "shipping".to_owned();
                e.stage = 0;
                Ok(e)
            })
            // stage 1: shipping done, update the customer
            .add(|mut e: Event| {
                if e.phase == Phase::Rollback {
                    return Ok(e);
                }
                e.to = ServiceId::Customer;
                e.endpoint = "customer".to_owned();
                e.stage = 0;
                Ok(e)
            })
            // stage 2: local work finished; the chain exhausts and control
            // returns to the caller
            .add(Ok);

        Self {
            sys,
            dispatcher,
            statuses,
        }
    }

    /// Whether the order for a transaction is currently marked paid.
    pub fn is_paid(&self, txid: &TxId) -> bool {
        self.statuses.lock().get(txid) == Some(&OrderStatus::Paid)
    }

    /// Whether the order for a transaction was cancelled by compensation.
    pub fn is_cancelled(&self, txid: &TxId) -> bool {
        self.statuses.lock().get(txid) == Some(&OrderStatus::Cancelled)
    }
}

impl Service for OrderService {
    fn id(&self) -> ServiceId {
        ServiceId::Order
    }

    fn receive(&self) {
        while let Ok(event) = self.sys.mailbox().pull(ServiceId::Order) {
            self.dispatcher.dispatch(event);
        }
    }
}
