//! newsvendor — the single-store book retailer demo for rust_sc.
//!
//! A manufacturer with unlimited stock, one store starting with a single
//! copy, and one customer ordering a Poisson-distributed quantity each day.
//! The buyer tops the network up to a 90 % service level; the store earns
//! the customer price per sale and pays the vendor cost per purchase plus a
//! holding cost per book per day.
//!
//! ```text
//! cargo run -p newsvendor -- --horizon 30 --output ./out
//! RUST_LOG=debug cargo run -p newsvendor -- --horizon 5
//! cargo run -p newsvendor -- --profile ports_demo_profile --horizon 20
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use sc_core::{RunParameters, Tick};
use sc_modules::newsvendor::DEFAULT_RESOURCE;
use sc_modules::standard_registry;
use sc_output::{CsvWriter, SimOutputObserver};
use sc_sim::{NoopObserver, RunStatus, SimBuilder, SimObserver, SupplyChainSim};

#[derive(Parser, Debug)]
#[command(version, about = "Newsvendor supply-chain simulation")]
struct Args {
    /// JSON run-parameter file; the flags below override its values.
    #[arg(long)]
    params: Option<PathBuf>,

    /// Profile name or JSON profile path, e.g. `ports_demo_profile`.
    #[arg(long)]
    profile: Option<String>,

    /// Master random seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Number of ticks to simulate.
    #[arg(long)]
    horizon: Option<u64>,

    /// Tick length: daily, hourly or half-hourly.
    #[arg(long)]
    increment: Option<String>,

    /// Directory for rewards.csv and inventory.csv.
    #[arg(long)]
    output: Option<PathBuf>,

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
        None => RunParameters::default(),
    };
    if let Some(profile) = &args.profile {
        params.profile = profile.clone();
    }
    if let Some(seed) = args.seed {
        params.simulation_seed = seed;
    }
    if let Some(horizon) = args.horizon {
        params.time_horizon = horizon;
    }
    if let Some(increment) = &args.increment {
        params.time_increment = increment.clone();
    }
    Ok(params)
}

fn print_status(sim: &SupplyChainSim) {
    let Some(state) = sim.state() else { return };
    let net = &state.network;
    let stock = net.total_on_hand(DEFAULT_RESOURCE);
    let sold = net.total_delivered(DEFAULT_RESOURCE);
    println!(
        "{:>5}  {}  stock {:>4}  in transit {:>4}  sold {:>5}  open orders {:>3}  reward {:>10.2}",
        state.clock.to_string(),
        state.date_time,
        stock,
        net.total_in_flight(DEFAULT_RESOURCE),
        sold,
        state.customer_orders.len(),
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

    println!("=== newsvendor: rust_sc supply-chain simulation ===");
    println!(
        "Profile: {}  |  Seed: {}  |  Horizon: {} x {}  |  Start: {}",
        params.profile, params.simulation_seed, params.time_horizon, params.time_increment, params.start_date
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
            let mut observer = SimOutputObserver::new(writer);
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
    println!();
    println!("Time profile:");
    for (phase, elapsed) in sim.time_profile().phases() {
        println!("  {phase:<28} {elapsed:>10.3?}");
    }
    Ok(())
}
