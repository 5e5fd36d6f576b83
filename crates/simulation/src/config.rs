//! Simulation run configuration.

use serde::{Deserialize, Serialize};

/// How long and how deterministically to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of rounds to drive.
    #[serde(default = "default_rounds")]
    pub rounds: u64,

    /// Seed for deterministic workload generation.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_rounds() -> u64 {
    20
}

fn default_seed() -> u64 {
    42
}

impl SimulationConfig {
    /// Create a config with the defaults (20 rounds, seed 42).
    pub fn new() -> Self {
        Self {
            rounds: default_rounds(),
            seed: default_seed(),
        }
    }

    /// Set the number of rounds.
    pub fn with_rounds(mut self, rounds: u64) -> Self {
        self.rounds = rounds;
        self
    }

    /// Set the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::new()
    }
}
