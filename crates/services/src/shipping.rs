//! Shipping service: a single-stage leaf endpoint.

use parking_lot::Mutex;
use sagasim_core::{Event, EventDispatcher, Service, System};
use sagasim_types::{Phase, ServiceId, TxId};
use std::sync::Arc;
use tracing::debug;

/// Books a shipment per transaction; compensation cancels the booking.
pub struct ShippingService {
    sys: Arc<System>,
    dispatcher: EventDispatcher,
    booked: Arc<Mutex<Vec<TxId>>>,
}

impl ShippingService {
    /// Create the service and register its handler chain.
    pub fn new(sys: Arc<System>) -> Self {
        let mut dispatcher = EventDispatcher::new(Arc::clone(sys.mailbox()), ServiceId::Shipping);
        let booked: Arc<Mutex<Vec<TxId>>> = Arc::default();

        let book = Arc::clone(&booked);
        dispatcher.focus("shipping").add(move |e: Event| {
            if e.phase == Phase::Rollback {
                book.lock().retain(|txid| txid != &e.txid);
                debug!(txid = %e.txid, "shipment cancelled");
                return Ok(e);
            }
            book.lock().push(e.txid.clone());
            Ok(e)
        });

        Self {
            sys,
            dispatcher,
            booked,
        }
    }

    /// Whether a shipment is currently booked for a transaction.
    pub fn is_booked(&self, txid: &TxId) -> bool {
        self.booked.lock().contains(txid)
    }
}

impl Service for ShippingService {
    fn id(&self) -> ServiceId {
        ServiceId::Shipping
    }

    fn receive(&self) {
        while let Ok(event) = self.sys.mailbox().pull(ServiceId::Shipping) {
            self.dispatcher.dispatch(event);
        }
    }
}
