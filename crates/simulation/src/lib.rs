//! Failure injection and the round-driving simulation loop.
//!
//! The driver owns the only clock-advance call in the system. Each round it
//! consults the failure pattern for every service, then fans out one task
//! per live service and waits for all of them before the next tick: no
//! work from round R + 1 starts before every service finishes round R.

mod config;
mod interval;
mod pattern;
mod runner;

pub use config::SimulationConfig;
pub use interval::Interval;
pub use pattern::{DefinedIntervalPattern, FailurePattern};
pub use runner::{RoundSimulator, SimulationStats};
