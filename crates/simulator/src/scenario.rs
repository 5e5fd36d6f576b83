//! The demo payment-saga scenario and its JSON-loadable configuration.

use sagasim_core::{Report, Service, System};
use sagasim_saga::{RoundGateway, TxManager};
use sagasim_services::{
    CustomerService, NotificationService, OrderService, PaymentService, ShippingService,
};
use sagasim_simulation::{
    DefinedIntervalPattern, Interval, RoundSimulator, SimulationConfig,
};
use sagasim_types::{Request, ServiceId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Failure intervals for one service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureSpec {
    pub service: ServiceId,
    pub intervals: Vec<Interval>,
}

/// A complete run description: how long to simulate and which services go
/// down when. Loadable from a JSON scenario file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub failures: Vec<FailureSpec>,
}

impl ScenarioConfig {
    /// The built-in demo scenario: default simulation settings plus a
    /// failure schedule that knocks out the gateway and the customer
    /// service early in the run.
    pub fn demo() -> Self {
        use sagasim_types::FailureKind::Crash;
        Self {
            simulation: SimulationConfig::new(),
            failures: vec![
                FailureSpec {
                    service: ServiceId::Gateway,
                    intervals: vec![
                        Interval::new(1, 2, Crash),
                        Interval::new(3, 4, Crash),
                        Interval::new(7, 8, Crash),
                    ],
                },
                FailureSpec {
                    service: ServiceId::Customer,
                    intervals: vec![
                        Interval::new(1, 5, Crash),
                        Interval::new(3, 7, Crash),
                        Interval::new(8, 9, Crash),
                        Interval::new(12, 15, Crash),
                    ],
                },
            ],
        }
    }

    /// Parse a scenario from its JSON form.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Build the failure pattern described by this config.
    pub fn pattern(&self) -> DefinedIntervalPattern {
        self.failures.iter().fold(
            DefinedIntervalPattern::new(),
            |pattern, spec| pattern.with_service(spec.service, spec.intervals.clone()),
        )
    }
}

/// The canonical demo request: a payment for one order.
pub fn demo_request() -> Request {
    Request::new(ServiceId::Payment, "payment")
        .with_field("order_id", "order-1")
        .with_field("customer_id", "customer-123")
}

/// The fully wired demo system.
///
/// Every participant is kept as a typed handle so callers can inspect
/// ledgers and transaction outcomes after (or between) rounds.
pub struct Scenario {
    pub system: Arc<System>,
    pub report: Arc<Report>,
    pub gateway: Arc<RoundGateway>,
    pub tx_manager: Arc<TxManager>,
    pub payment: Arc<PaymentService>,
    pub order: Arc<OrderService>,
    pub shipping: Arc<ShippingService>,
    pub customer: Arc<CustomerService>,
    pub notification: Arc<NotificationService>,
}

impl Scenario {
    /// Wire a fresh system with every demo service registered.
    pub fn build() -> Self {
        let report = Arc::new(Report::new());
        let system = Arc::new(System::new(Box::new(Arc::clone(&report))));
        Self {
            gateway: Arc::new(RoundGateway::new(Arc::clone(&system))),
            tx_manager: Arc::new(TxManager::new(Arc::clone(&system))),
            payment: Arc::new(PaymentService::new(Arc::clone(&system))),
            order: Arc::new(OrderService::new(Arc::clone(&system))),
            shipping: Arc::new(ShippingService::new(Arc::clone(&system))),
            customer: Arc::new(CustomerService::new(Arc::clone(&system))),
            notification: Arc::new(NotificationService::new(Arc::clone(&system))),
            system,
            report,
        }
    }

    /// Every participant, in registration order, for the round driver.
    pub fn services(&self) -> Vec<Arc<dyn Service>> {
        vec![
            Arc::clone(&self.gateway) as Arc<dyn Service>,
            Arc::clone(&self.tx_manager) as Arc<dyn Service>,
            Arc::clone(&self.payment) as Arc<dyn Service>,
            Arc::clone(&self.order) as Arc<dyn Service>,
            Arc::clone(&self.shipping) as Arc<dyn Service>,
            Arc::clone(&self.customer) as Arc<dyn Service>,
            Arc::clone(&self.notification) as Arc<dyn Service>,
        ]
    }

    /// Build a round driver for this scenario from a config.
    pub fn simulator(&self, config: &ScenarioConfig) -> RoundSimulator {
        RoundSimulator::new(
            Arc::clone(&self.system),
            self.services(),
            Box::new(config.pattern()),
            config.simulation,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sagasim_types::{FailureKind, Round, TxId, TxState};

    #[test]
    fn test_scenario_wires_all_participants() {
        let scenario = Scenario::build();
        let ids: Vec<ServiceId> = scenario.services().iter().map(|s| s.id()).collect();
        assert_eq!(ids.len(), 7);
        assert!(ids.contains(&ServiceId::Gateway));
        assert!(ids.contains(&ServiceId::TxManager));
        for service in ServiceId::MAILBOX_SERVICES {
            assert!(ids.contains(&service), "{service} missing");
        }
    }

    #[test]
    fn test_config_json_roundtrip() {
        let text = r#"{
            "simulation": { "rounds": 40, "seed": 7 },
            "failures": [
                {
                    "service": "shipping",
                    "intervals": [ { "start": 3, "end": 6, "kind": "crash" } ]
                }
            ]
        }"#;
        let config = ScenarioConfig::from_json(text).unwrap();
        assert_eq!(config.simulation.rounds, 40);
        assert_eq!(config.simulation.seed, 7);
        assert_eq!(config.failures.len(), 1);
        assert_eq!(config.failures[0].service, ServiceId::Shipping);
        assert_eq!(
            config.failures[0].intervals,
            vec![Interval::new(3, 6, FailureKind::Crash)]
        );

        let back = ScenarioConfig::from_json(&serde_json::to_string(&config).unwrap()).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_demo_saga_completes_despite_outages() {
        let scenario = Scenario::build();
        scenario.gateway.submit(demo_request(), Round::ZERO);
        scenario.simulator(&ScenarioConfig::demo()).run();

        let txid = TxId::new("1");
        assert_eq!(scenario.tx_manager.state(&txid), TxState::Complete);
        assert!(scenario.notification.was_notified(&txid));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ScenarioConfig::from_json("{}").unwrap();
        assert_eq!(config.simulation.rounds, 20);
        assert!(config.failures.is_empty());
    }
}
