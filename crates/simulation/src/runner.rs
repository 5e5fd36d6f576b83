//! The round driver.

use crate::{FailurePattern, SimulationConfig};
use sagasim_core::{Service, System};
use std::sync::Arc;
use tracing::{debug, info};

/// Summary of one simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationStats {
    /// Rounds actually driven.
    pub rounds: u64,
    /// Events accepted by the mailbox system over the whole run.
    pub events_sent: u64,
}

/// Drives the simulation: advances the clock, applies failure injection,
/// and runs every live service's receive pass once per round behind a
/// fan-out/join barrier.
pub struct RoundSimulator {
    system: Arc<System>,
    services: Vec<Arc<dyn Service>>,
    pattern: Box<dyn FailurePattern>,
    config: SimulationConfig,
}

impl RoundSimulator {
    /// Create a driver over the given services. The pattern is initialized
    /// here, before any round runs.
    pub fn new(
        system: Arc<System>,
        services: Vec<Arc<dyn Service>>,
        mut pattern: Box<dyn FailurePattern>,
        config: SimulationConfig,
    ) -> Self {
        pattern.init();
        Self {
            system,
            services,
            pattern,
            config,
        }
    }

    /// Run the configured number of rounds.
    pub fn run(&mut self) -> SimulationStats {
        info!(rounds = self.config.rounds, seed = self.config.seed, "simulation start");
        for _ in 0..self.config.rounds {
            self.step();
        }
        let stats = SimulationStats {
            rounds: self.config.rounds,
            events_sent: self.system.mailbox().sent_count(),
        };
        info!(?stats, "simulation end");
        stats
    }

    /// Drive a single round.
    ///
    /// A service marked failed this round skips its receive pass entirely;
    /// its mailbox keeps accumulating events until it recovers. The rayon
    /// scope joins exactly the tasks it spawned, so nothing from the next
    /// round can start early.
    pub fn step(&mut self) {
        let round = self.system.advance_round();

        for service in &self.services {
            let failure = self.pattern.get(service.id(), round);
            if let Some(kind) = failure {
                debug!(service = %service.id(), %round, %kind, "failure injected");
            }
            self.system.set_failure(service.id(), failure);
        }

        rayon::scope(|scope| {
            for service in &self.services {
                if self.system.is_failed(service.id()) {
                    continue;
                }
                let service = Arc::clone(service);
                scope.spawn(move |_| service.receive());
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DefinedIntervalPattern, Interval};
    use parking_lot::Mutex;
    use sagasim_core::TraceSink;
    use sagasim_types::{FailureKind, Round, ServiceId};

    struct CountingService {
        id: ServiceId,
        rounds_seen: Mutex<Vec<Round>>,
        system: Arc<System>,
    }

    impl Service for CountingService {
        fn id(&self) -> ServiceId {
            self.id
        }

        fn receive(&self) {
            self.rounds_seen.lock().push(self.system.round());
        }
    }

    fn system() -> Arc<System> {
        Arc::new(System::new(Box::<TraceSink>::default()))
    }

    #[test]
    fn test_every_service_runs_every_round() {
        let sys = system();
        let svc = Arc::new(CountingService {
            id: ServiceId::Payment,
            rounds_seen: Mutex::new(Vec::new()),
            system: Arc::clone(&sys),
        });
        let mut sim = RoundSimulator::new(
            Arc::clone(&sys),
            vec![Arc::clone(&svc) as Arc<dyn Service>],
            Box::new(DefinedIntervalPattern::new()),
            SimulationConfig::new().with_rounds(5),
        );

        let stats = sim.run();
        assert_eq!(stats.rounds, 5);
        assert_eq!(
            *svc.rounds_seen.lock(),
            vec![Round(1), Round(2), Round(3), Round(4), Round(5)]
        );
    }

    #[test]
    fn test_failed_service_skips_its_rounds() {
        let sys = system();
        let svc = Arc::new(CountingService {
            id: ServiceId::Order,
            rounds_seen: Mutex::new(Vec::new()),
            system: Arc::clone(&sys),
        });
        let pattern = DefinedIntervalPattern::new().with_service(
            ServiceId::Order,
            vec![Interval::new(2, 3, FailureKind::Crash)],
        );
        let mut sim = RoundSimulator::new(
            Arc::clone(&sys),
            vec![Arc::clone(&svc) as Arc<dyn Service>],
            Box::new(pattern),
            SimulationConfig::new().with_rounds(5),
        );
        sim.run();

        assert_eq!(
            *svc.rounds_seen.lock(),
            vec![Round(1), Round(4), Round(5)]
        );
        // recovered by round 4, so the table reads healthy at the end
        assert!(!sys.is_failed(ServiceId::Order));
    }
}
