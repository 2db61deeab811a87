/*
 * Headless Runner
 *
 * Steps a flock without a window and logs a summary every few ticks. Handy for
 * profiling and for checking parameter files before opening the viewer.
 */

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use flock_grid::{NeighborSearch, Simulation, SimulationParams};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SearchArg {
    FullScan,
    GridWindow,
}

impl From<SearchArg> for NeighborSearch {
    fn from(arg: SearchArg) -> Self {
        match arg {
            SearchArg::FullScan => NeighborSearch::FullScan,
            SearchArg::GridWindow => NeighborSearch::GridWindow,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "flock-headless", about = "Run the boid simulation without a window")]
struct Cli {
    /// JSON file overriding any subset of the simulation parameters
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of ticks to run
    #[arg(long, default_value_t = 600)]
    ticks: u64,
    /// Initial flock size (overrides the config)
    #[arg(long)]
    agents: Option<usize>,
    /// RNG seed (overrides the config)
    #[arg(long)]
    seed: Option<u64>,
    /// Milliseconds per tick
    #[arg(long, default_value_t = 16.0)]
    dt_ms: f32,
    /// Neighbour search strategy (overrides the config)
    #[arg(long, value_enum)]
    search: Option<SearchArg>,
    /// Log a summary every N ticks
    #[arg(long, default_value_t = 60)]
    report_every: u64,
}

fn load_params(cli: &Cli) -> Result<SimulationParams> {
    let mut params = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => SimulationParams::default(),
    };

    if let Some(agents) = cli.agents {
        params.initial_agents = agents;
        params.capacity = params.capacity.max(agents);
    }
    if let Some(seed) = cli.seed {
        params.seed = Some(seed);
    }
    if let Some(search) = cli.search {
        params.neighbor_search = search.into();
    }
    Ok(params)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let params = load_params(&cli)?;
    let mut simulation = Simulation::new(params).context("building simulation")?;

    let started = Instant::now();
    let report_every = cli.report_every.max(1);
    for _ in 0..cli.ticks {
        simulation.step(cli.dt_ms);

        if simulation.tick() % report_every == 0 {
            let stats = simulation.stats();
            info!(
                tick = simulation.tick(),
                agents = stats.agents,
                with_neighbors = stats.agents_with_neighbors,
                mean_neighbors = stats.mean_neighbors,
                mean_speed = stats.mean_speed,
                "flock summary"
            );
        }
    }

    let elapsed = started.elapsed();
    info!(
        ticks = cli.ticks,
        elapsed_ms = elapsed.as_secs_f64() * 1000.0,
        ms_per_tick = elapsed.as_secs_f64() * 1000.0 / cli.ticks.max(1) as f64,
        "run complete"
    );
    Ok(())
}
