//! Domain-specific identifier types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The discrete simulation time unit. The engine's only clock.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Round(pub u64);

impl Round {
    /// Round zero, before the driver has ticked.
    pub const ZERO: Self = Round(0);

    /// Get the next round.
    pub fn next(self) -> Self {
        Round(self.0 + 1)
    }

    /// Get the raw round number.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// Transaction identifier, assigned once at gateway ingress and stable for
/// the transaction's lifetime, compensating events included.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxId(String);

impl TxId {
    /// Create a transaction id from its string form.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tx-{}", self.0)
    }
}

/// The closed set of services participating in the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceId {
    /// Saga coordinator deciding commit, abort, and compensation.
    TxManager,
    /// Ingress point turning external requests into events.
    Gateway,
    Payment,
    Order,
    Shipping,
    Customer,
    Notification,
}

impl ServiceId {
    /// All services that own a mailbox in the event-queue system.
    ///
    /// The gateway is excluded: it drains its own request inbox and only
    /// ever produces events, never receives them.
    pub const MAILBOX_SERVICES: [ServiceId; 6] = [
        ServiceId::TxManager,
        ServiceId::Payment,
        ServiceId::Order,
        ServiceId::Shipping,
        ServiceId::Customer,
        ServiceId::Notification,
    ];

    /// Get the wire/log name for this service.
    pub fn name(&self) -> &'static str {
        match self {
            ServiceId::TxManager => "tx_manager",
            ServiceId::Gateway => "gateway",
            ServiceId::Payment => "payment",
            ServiceId::Order => "order",
            ServiceId::Shipping => "shipping",
            ServiceId::Customer => "customer",
            ServiceId::Notification => "notification",
        }
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One call/rollback stack frame: the exact `(service, endpoint, stage)`
/// position a transaction can return to or compensate at.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Frame {
    /// Service owning the handler chain.
    pub service: ServiceId,
    /// Handler chain within the service.
    pub endpoint: String,
    /// Position within the chain.
    pub stage: usize,
}

impl Frame {
    /// Create a frame.
    pub fn new(service: ServiceId, endpoint: impl Into<String>, stage: usize) -> Self {
        Self {
            service,
            endpoint: endpoint.into(),
            stage,
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}|{}", self.service, self.endpoint, self.stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_next() {
        assert_eq!(Round::ZERO.next(), Round(1));
        assert_eq!(Round(41).next(), Round(42));
    }

    #[test]
    fn test_service_display() {
        assert_eq!(ServiceId::TxManager.to_string(), "tx_manager");
        assert_eq!(ServiceId::Notification.to_string(), "notification");
    }

    #[test]
    fn test_frame_display() {
        let frame = Frame::new(ServiceId::Payment, "payment", 2);
        assert_eq!(frame.to_string(), "payment|payment|2");
    }

    #[test]
    fn test_service_serde_names() {
        let json = serde_json::to_string(&ServiceId::TxManager).unwrap();
        assert_eq!(json, "\"tx_manager\"");
        let back: ServiceId = serde_json::from_str("\"shipping\"").unwrap();
        assert_eq!(back, ServiceId::Shipping);
    }
}
