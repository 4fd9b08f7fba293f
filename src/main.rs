//! Province Chronicle - Entry Point
//!
//! Generates a province map, simulates its history for a number of months
//! and saves monthly snapshots and reports to disk.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use province_chronicle::{
    generate_world, ChronicleConfig, HistorySaveScheduler, HistorySimulation, HistoryStore, Result,
};

#[derive(Parser, Debug)]
#[command(name = "province-chronicle")]
#[command(about = "Generate a province map and chronicle its history month by month")]
struct Args {
    /// TOML file with [generation] and [simulation] tables
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Override the generation seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override the number of provinces
    #[arg(long)]
    polygons: Option<u32>,

    /// Months of history to simulate
    #[arg(long, default_value_t = 120)]
    months: u32,

    /// Directory that receives one sub-directory per seed
    #[arg(long, short = 'o', default_value = "chronicles")]
    output: PathBuf,

    /// Save worker threads (0 = one per core)
    #[arg(long)]
    workers: Option<usize>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("province_chronicle=info")),
        )
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Chronicle failed");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => ChronicleConfig::load(path)?,
        None => ChronicleConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.generation.seed = seed;
    }
    if let Some(polygons) = args.polygons {
        config.generation.polygon_count = polygons;
    }
    if let Some(workers) = args.workers {
        config.simulation.save_workers = workers;
    }

    let started = Instant::now();
    let graph = generate_world(&config.generation)?;
    info!(
        provinces = graph.provinces.len(),
        seed = config.generation.seed,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "World generated"
    );

    let store = Arc::new(HistoryStore::open(&args.output, config.generation.seed)?);
    store.write_settings(&config.generation)?;

    let workers = config.simulation.save_workers;
    let mut sim = HistorySimulation::new(graph, config.simulation)?;
    let mut scheduler = HistorySaveScheduler::new(store.clone(), workers)?;

    let started = Instant::now();
    for month in 1..=args.months {
        sim.simulate_month();
        if month % 12 == 0 {
            scheduler.update()?;
            scheduler.start_save(sim.archive());
            let stats = sim.stats();
            info!(
                date = %sim.date(),
                countries = stats.countries,
                wars = stats.wars,
                population = stats.population,
                "Year complete"
            );
        }
    }
    info!(
        months = args.months,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "History simulated"
    );

    // A second pass retries months whose writes failed in the first
    for _ in 0..2 {
        scheduler.start_save(sim.archive());
        scheduler.finish()?;
    }
    store.write_world_state(&sim.world_state_json()?)?;

    let (done, total) = scheduler.progress();
    info!(done, total, path = %store.root().display(), "Chronicle saved");
    Ok(())
}
