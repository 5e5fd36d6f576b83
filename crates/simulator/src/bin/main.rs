//! sagasim CLI: run the demo payment saga under failure injection.

use clap::Parser;
use sagasim_simulator::{OrderWorkload, Scenario, ScenarioConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sagasim")]
#[command(about = "Round-based saga transaction simulator")]
#[command(version)]
struct Cli {
    /// Number of rounds to simulate (overrides the scenario file)
    #[arg(long)]
    rounds: Option<u64>,

    /// Workload seed (overrides the scenario file)
    #[arg(long)]
    seed: Option<u64>,

    /// Number of generated order requests
    #[arg(long, default_value = "3")]
    requests: usize,

    /// Requests arrive at random rounds in [0, arrival-span)
    #[arg(long, default_value = "5")]
    arrival_span: u64,

    /// JSON scenario file with simulation settings and failure intervals
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Print the full per-service delivery report after the run
    #[arg(long)]
    report: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.scenario {
        Some(path) => ScenarioConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => ScenarioConfig::demo(),
    };
    if let Some(rounds) = cli.rounds {
        config.simulation.rounds = rounds;
    }
    if let Some(seed) = cli.seed {
        config.simulation.seed = seed;
    }

    let scenario = Scenario::build();
    let mut workload = OrderWorkload::new(config.simulation.seed);
    workload.submit(&scenario.gateway, cli.requests, cli.arrival_span);

    let stats = scenario.simulator(&config).run();

    println!("rounds:      {}", stats.rounds);
    println!("events sent: {}", stats.events_sent);
    println!("deliveries:  {}", scenario.report.len());
    if cli.report {
        scenario.report.write_all(&mut std::io::stdout().lock())?;
    }
    Ok(())
}
