//! wastesim: run one waste-collection simulation from the command line.
//!
//! Bins on a grid city fill up over simulated days and auction their
//! collection to a fleet of trucks.  One row of run statistics is appended
//! to the results CSV at the end, including after Ctrl-C.
//!
//! ```text
//! wastesim --config config.toml --days 2 --seed 8 --frames frames.csv
//! RUST_LOG=wcs=debug wastesim
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use wcs_core::SimConfig;
use wcs_output::{ConsoleReporter, CsvWriter, SimOutputObserver};
use wcs_sim::SimBuilder;

#[cfg(test)]
mod tests;

const DEFAULT_FILTER: &str = "wastesim=info,wcs=info";

#[derive(Parser, Debug)]
#[command(author, version, about = "Contract-net waste collection simulation", long_about = None)]
struct Cli {
    /// TOML configuration; built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override `simulation.days`
    #[arg(long)]
    days: Option<u32>,

    /// Override `simulation.seed` (bin layout)
    #[arg(long)]
    seed: Option<u64>,

    /// Override `simulation.live_seed` (fill, malfunctions, traffic)
    #[arg(long)]
    live_seed: Option<u64>,

    /// Statistics CSV, appended to across runs
    #[arg(long, default_value = "simulation_results.csv")]
    results: PathBuf,

    /// Per-hour entity CSV for replay by an external renderer
    #[arg(long)]
    frames: Option<PathBuf>,

    /// Also record statistics and frames in an SQLite database
    #[cfg(feature = "sqlite")]
    #[arg(long)]
    db: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let days = config.simulation.days;

    let sim = SimBuilder::new(config).build().context("building simulation")?;

    let mut writer = CsvWriter::new(&cli.results);
    if let Some(path) = &cli.frames {
        writer = writer.with_frames(path).with_context(|| format!("opening {}", path.display()))?;
    }
    let mut observer = (ConsoleReporter::new(days), SimOutputObserver::new(writer));

    #[cfg(feature = "sqlite")]
    let mut db = match &cli.db {
        Some(path) => Some(SimOutputObserver::new(
            wcs_output::SqliteWriter::new(path).with_context(|| format!("opening {}", path.display()))?,
        )),
        None => None,
    };

    #[cfg(feature = "sqlite")]
    let report = match db.as_mut() {
        Some(db) => sim.run_until(&mut (&mut observer, db), interrupted()).await,
        None => sim.run_until(&mut observer, interrupted()).await,
    };
    #[cfg(not(feature = "sqlite"))]
    let report = sim.run_until(&mut observer, interrupted()).await;

    if report.interrupted {
        warn!(hours = report.hours_completed, "run stopped early; partial statistics saved");
    }
    if let Some(e) = observer.1.take_error() {
        return Err(e).context("writing results");
    }
    #[cfg(feature = "sqlite")]
    let db_error = db.as_mut().and_then(SimOutputObserver::take_error);
    #[cfg(not(feature = "sqlite"))]
    let db_error: Option<wcs_output::OutputError> = None;
    if let Some(e) = db_error {
        return Err(e).context("writing database");
    }

    info!(results = %cli.results.display(), "simulation ended");
    Ok(())
}

fn load_config(cli: &Cli) -> Result<SimConfig> {
    let mut config = match &cli.config {
        Some(path) => SimConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => SimConfig::default(),
    };
    if let Some(days) = cli.days {
        config.simulation.days = days;
    }
    if let Some(seed) = cli.seed {
        config.simulation.seed = seed;
    }
    if cli.live_seed.is_some() {
        config.simulation.live_seed = cli.live_seed;
    }
    Ok(config)
}

/// Resolves on Ctrl-C.  Never resolves if the handler cannot be installed.
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("interrupt received");
}
