//! Customer service: accrues loyalty points for completed purchases.

use indexmap::IndexMap;
use parking_lot::Mutex;
use sagasim_core::{Event, EventDispatcher, Service, System};
use sagasim_types::{Phase, ServiceId};
use std::sync::Arc;
use tracing::debug;

const POINTS_PER_PURCHASE: i64 = 10;

/// Adds shopping points per purchase; compensation deducts them again.
pub struct CustomerService {
    sys: Arc<System>,
    dispatcher: EventDispatcher,
    points: Arc<Mutex<IndexMap<String, i64>>>,
}

impl CustomerService {
    /// Create the service and register its handler chain.
    pub fn new(sys: Arc<System>) -> Self {
        let mut dispatcher = EventDispatcher::new(Arc::clone(sys.mailbox()), ServiceId::Customer);
        let points: Arc<Mutex<IndexMap<String, i64>>> = Arc::default();

        let accrue = Arc::clone(&points);
        dispatcher.focus("customer").add(move |e: Event| {
            let Some(customer_id) = e.body.get_str("customer_id") else {
                // nothing to credit; fine for events without customer data
                return Ok(e);
            };
            let delta = if e.phase == Phase::Rollback {
                debug!(txid = %e.txid, customer_id, "points deducted");
                -POINTS_PER_PURCHASE
            } else {
                POINTS_PER_PURCHASE
            };
            *accrue.lock().entry(customer_id.to_owned()).or_default() += delta;
            Ok(e)
        });

        Self {
            sys,
            dispatcher,
            points,
        }
    }

    /// Current point balance for a customer.
    pub fn points_of(&self, customer_id: &str) -> i64 {
        self.points.lock().get(customer_id).copied().unwrap_or(0)
    }
}

impl Service for CustomerService {
    fn id(&self) -> ServiceId {
        ServiceId::Customer
    }

    fn receive(&self) {
        while let Ok(event) = self.sys.mailbox().pull(ServiceId::Customer) {
            self.dispatcher.dispatch(event);
        }
    }
}
