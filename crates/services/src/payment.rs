//! Payment service: owns the demo saga's control endpoint.

use indexmap::IndexMap;
use parking_lot::Mutex;
use sagasim_core::{Event, EventDispatcher, SagaError, Service, System};
use sagasim_types::{Phase, ServiceId, TxId};
use std::sync::Arc;
use tracing::debug;

/// A recorded payment, one per transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRecord {
    pub order_id: String,
    pub customer_id: String,
}

#[derive(Default)]
struct PaymentLedger {
    entries: Mutex<IndexMap<TxId, PaymentRecord>>,
}

impl PaymentLedger {
    fn insert(&self, txid: TxId, record: PaymentRecord) {
        self.entries.lock().insert(txid, record);
    }

    fn remove(&self, txid: &TxId) -> Option<PaymentRecord> {
        self.entries.lock().shift_remove(txid)
    }

    fn get(&self, txid: &TxId) -> Option<PaymentRecord> {
        self.entries.lock().get(txid).cloned()
    }

    fn len(&self) -> usize {
        self.entries.lock().len()
    }
}

/// The saga's entry service. Endpoint `payment` drives the whole flow:
/// charge, delegate to order, vote commit, notify, finalize.
pub struct PaymentService {
    sys: Arc<System>,
    dispatcher: EventDispatcher,
    ledger: Arc<PaymentLedger>,
}

impl PaymentService {
    /// Create the service and register its handler chains.
    pub fn new(sys: Arc<System>) -> Self {
        let mut dispatcher = EventDispatcher::new(Arc::clone(sys.mailbox()), ServiceId::Payment);
        let ledger = Arc::new(PaymentLedger::default());

        let charge_ledger = Arc::clone(&ledger);
        dispatcher
            .focus("payment")
            // stage 0: record the payment, then call the order endpoint
            .add(move |mut e: Event| {
                if e.phase == Phase::Rollback {
                    if charge_ledger.remove(&e.txid).is_some() {
                        debug!(txid = %e.txid, "payment refunded");
                    }
                    return Ok(e);
                }
                let order_id = e
                    .body
                    .get_str("order_id")
                    .ok_or(SagaError::MissingField("order_id"))?
                    .to_owned();
                let customer_id = e
                    .body
                    .get_str("customer_id")
                    .ok_or(SagaError::MissingField("customer_id"))?
                    .to_owned();
                charge_ledger.insert(
                    e.txid.clone(),
                    PaymentRecord {
                        order_id,
                        customer_id,
                    },
                );
                e.to = ServiceId::Order;
                e.endpoint = "order".to_owned();
                e.stage = 0;
                Ok(e)
            })
            // stage 1: every downstream call returned, vote commit
            .add(|mut e: Event| {
                if e.phase == Phase::Rollback {
                    return Ok(e);
                }
                e.commit();
                Ok(e)
            })
            // stage 2: commit acknowledged, fan out the notification
            .add(|mut e: Event| {
                if e.phase == Phase::Rollback {
                    return Ok(e);
                }
                e.to = ServiceId::Notification;
                e.endpoint = "notification".to_owned();
                e.stage = 0;
                Ok(e)
            })
            // stage 3: nothing left to do locally; the exhausted chain
            // routes to the transaction manager with Phase::End
            .add(|mut e: Event| {
                if e.phase == Phase::Processing {
                    e.body.set("payment_settled", true);
                }
                Ok(e)
            });

        Self {
            sys,
            dispatcher,
            ledger,
        }
    }

    /// The recorded payment for a transaction, if still present.
    pub fn payment_for(&self, txid: &TxId) -> Option<PaymentRecord> {
        self.ledger.get(txid)
    }

    /// Number of recorded payments.
    pub fn recorded(&self) -> usize {
        self.ledger.len()
    }
}

impl Service for PaymentService {
    fn id(&self) -> ServiceId {
        ServiceId::Payment
    }

    fn receive(&self) {
        while let Ok(event) = self.sys.mailbox().pull(ServiceId::Payment) {
            self.dispatcher.dispatch(event);
        }
    }
}
