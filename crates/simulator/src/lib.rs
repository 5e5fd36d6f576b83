//! Ready-to-run saga scenarios on top of the simulation engine.
//!
//! Wires the demo payment saga (gateway, transaction manager, and the five
//! business services) into one [`Scenario`], loads failure schedules from
//! JSON, and generates seeded order workloads.
//!
//! # Example
//!
//! ```ignore
//! use sagasim_simulation::{RoundSimulator, SimulationConfig};
//! use sagasim_simulator::{OrderWorkload, Scenario, ScenarioConfig};
//!
//! let config = ScenarioConfig::default();
//! let scenario = Scenario::build();
//! OrderWorkload::new(config.simulation.seed).submit(&scenario.gateway, 3, 5);
//!
//! let mut sim = scenario.simulator(&config);
//! let stats = sim.run();
//! println!("{} events over {} rounds", stats.events_sent, stats.rounds);
//! ```

mod scenario;
mod workload;

pub use scenario::{demo_request, FailureSpec, Scenario, ScenarioConfig};
pub use workload::OrderWorkload;
