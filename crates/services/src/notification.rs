//! Notification service: fire-and-forget delivery, no compensation.

use parking_lot::Mutex;
use sagasim_core::{Event, EventDispatcher, Service, System};
use sagasim_types::{Phase, ServiceId, TxId};
use std::sync::Arc;
use tracing::info;

/// Records one notification per committed transaction. Notifications are
/// not undone on rollback; an apology is the best a real system could do.
pub struct NotificationService {
    sys: Arc<System>,
    dispatcher: EventDispatcher,
    delivered: Arc<Mutex<Vec<TxId>>>,
}

impl NotificationService {
    /// Create the service and register its handler chain.
    pub fn new(sys: Arc<System>) -> Self {
        let mut dispatcher =
            EventDispatcher::new(Arc::clone(sys.mailbox()), ServiceId::Notification);
        let delivered: Arc<Mutex<Vec<TxId>>> = Arc::default();

        let log = Arc::clone(&delivered);
        dispatcher.focus("notification").add(move |e: Event| {
            if e.phase == Phase::Rollback {
                return Ok(e);
            }
            info!(txid = %e.txid, "notification sent");
            log.lock().push(e.txid.clone());
            Ok(e)
        });

        Self {
            sys,
            dispatcher,
            delivered,
        }
    }

    /// Whether a notification went out for a transaction.
    pub fn was_notified(&self, txid: &TxId) -> bool {
        self.delivered.lock().contains(txid)
    }
}

impl Service for NotificationService {
    fn id(&self) -> ServiceId {
        ServiceId::Notification
    }

    fn receive(&self) {
        while let Ok(event) = self.sys.mailbox().pull(ServiceId::Notification) {
            self.dispatcher.dispatch(event);
        }
    }
}
