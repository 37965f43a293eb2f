//! national_grid — the electricity grid demo for rust_sc.
//!
//! Solar, onshore wind and gas generation feed one substation that serves a
//! single consumer.  Two batteries, or a fleet sized by `--batteries`,
//! absorb surplus and cover forecast deficits; whatever they cannot handle
//! goes to the balance mechanism.
//! Defaults to one week of half-hourly ticks.
//!
//! ```text
//! cargo run -p national_grid -- --horizon 48 --output ./grid-out
//! cargo run -p national_grid -- --sources solar --sources wind_onshore
//! cargo run -p national_grid -- --batteries 25
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use sc_core::{ResourceSelection, RunParameters, Tick};
use sc_modules::grid::{BALANCE_SINK, CONSUMERS, ELECTRICITY, GridTopology, SUBSTATION};
use sc_modules::{NATIONAL_GRID_FLEET_PROFILE, national_grid_params, standard_registry};
use sc_network::NodeKind;
use sc_output::{CsvWriter, SimOutputObserver};
use sc_sim::{NoopObserver, RunStatus, SimBuilder, SimObserver, SupplyChainSim};

#[derive(Parser, Debug)]
#[command(version, about = "National-grid supply-chain simulation")]
struct Args {
    /// JSON run-parameter file; the flags below override its values.
    #[arg(long)]
    params: Option<PathBuf>,

    /// Master random seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Number of ticks to simulate.
    #[arg(long)]
    horizon: Option<u64>,

    /// Tick length: daily, hourly or half-hourly.
    #[arg(long)]
    increment: Option<String>,

    /// Generation sources to model (repeatable); every source when omitted.
    #[arg(long = "sources", value_name = "RESOURCE")]
    sources: Vec<String>,

    /// Model a fleet of this many identical batteries instead of the two
    /// reference batteries.
    #[arg(long)]
    batteries: Option<u32>,

    /// Directory for rewards.csv and inventory.csv.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Write inventory every N ticks.
    #[arg(long, default_value_t = 1)]
    inventory_every: u64,

    /// Pause before this tick and print a status line (repeatable).
    #[arg(long = "break", value_name = "TICK")]
    breakpoints: Vec<u64>,
}

fn run_parameters(args: &Args) -> Result<RunParameters> {
    let mut params = match &args.params {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            RunParameters::from_json_str(&text)?
        }
        None => national_grid_params(),
    };
    if let Some(seed) = args.seed {
        params.simulation_seed = seed;
    }
    if let Some(horizon) = args.horizon {
        params.time_horizon = horizon;
    }
    if let Some(increment) = &args.increment {
        params.time_increment = increment.clone();
    }
    if !args.sources.is_empty() {
        params.resource_selection = ResourceSelection::Explicit(args.sources.clone());
    }
    if let Some(count) = args.batteries {
        params.profile = NATIONAL_GRID_FLEET_PROFILE.to_owned();
        params = params.with_param("num_batteries", count);
        if !params.extra.contains_key("max_battery_capacity") {
            params = params.with_param("max_battery_capacity", GridTopology::DEFAULT_MAX_BATTERY_CAPACITY);
        }
    }
    Ok(params)
}

fn print_status(sim: &SupplyChainSim) {
    let Some(state) = sim.state() else { return };
    let net = &state.network;
    let on_hand = |name: &str| net.node_by_name(name).map_or(0, |n| n.on_hand(ELECTRICITY));
    let delivered = |name: &str| net.node_by_name(name).map_or(0, |n| n.delivered(ELECTRICITY));
    let stored: i64 = net
        .nodes_of_kind(NodeKind::Storage)
        .into_iter()
        .map(|id| net.on_hand(id, ELECTRICITY))
        .sum();
    println!(
        "{:>5}  {}  substation {:>5}  stored {:>6}  consumed {:>6}  sunk {:>6}  reward {:>14.2}",
        state.clock.to_string(),
        state.date_time,
        on_hand(SUBSTATION),
        stored,
        delivered(CONSUMERS),
        delivered(BALANCE_SINK),
        sim.episode_reward(),
    );
}

/// Run to the horizon, printing a status line at every breakpoint.
fn run_to_end<O: SimObserver>(sim: &mut SupplyChainSim, observer: &mut O) -> Result<()> {
    while let RunStatus::Breakpoint(_) = sim.run_with(observer)? {
        print_status(sim);
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let params = run_parameters(&args)?;

    println!("=== national_grid: rust_sc supply-chain simulation ===");
    println!(
        "Profile: {}  |  Horizon: {} x {}  |  Start: {}  |  Sources: {:?}",
        params.profile, params.time_horizon, params.time_increment, params.start_date, params.resource_selection
    );
    println!();

    let registry = standard_registry();
    let mut sim = SimBuilder::new(&registry, params)
        .breakpoints(args.breakpoints.iter().copied().map(Tick))
        .build()?;
    info!(modules = ?sim.module_names(), "simulation built");

    match &args.output {
        Some(dir) => {
            let writer = CsvWriter::new(dir).with_context(|| format!("creating output in {}", dir.display()))?;
            let mut observer = SimOutputObserver::new(writer).inventory_every(args.inventory_every);
            run_to_end(&mut sim, &mut observer)?;
            match observer.take_error() {
                Some(e) => error!(dir = %dir.display(), error = %e, "writing output failed"),
                None => info!(dir = %dir.display(), "output written"),
            }
        }
        None => run_to_end(&mut sim, &mut NoopObserver)?,
    }

    println!();
    print_status(&sim);
    Ok(())
}
