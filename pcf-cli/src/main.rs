use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use pcf_cli::app::{self, WizardOptions};
use pcf_cli::config::PcfConfig;
use pcf_core::db::CalculationPoller;
use pcf_core::state::{PcfSession, SystemClock};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Product carbon footprint wizard.
///
/// Selects a product from the configured catalog, loads (or imports) its
/// bill of materials, runs the footprint calculation and reports the
/// per-category breakdown.
#[derive(Debug, Parser)]
struct Cli {
    /// Product id to calculate.
    #[arg(long, required_unless_present = "query", conflicts_with = "query")]
    product: Option<String>,

    /// Pick the first product whose name or code contains this text.
    #[arg(long)]
    query: Option<String>,

    /// CSV file that replaces the catalog BOM
    /// (`name,quantity,unit,category[,emission_factor_id]`).
    #[arg(long)]
    bom: Option<PathBuf>,

    /// Directory to write `bom.csv` and `results.csv` into.
    #[arg(long)]
    out: Option<PathBuf>,

    /// TOML config file with `[history]`, `[polling]`, `[database]` and
    /// `[logging]` tables.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Repository backend; overrides the config file.
    #[arg(long)]
    backend: Option<String>,

    /// Backend connection string. For `memory` this is `:demo:` or a
    /// catalog TOML path. Overrides the config file.
    #[arg(long)]
    db: Option<String>,
}

// ─── tracing ─────────────────────────────────────────────────────────────────

/// Initialise the tracing subscriber.
///
/// * Honours `RUST_LOG` when set.
/// * Falls back to `default_level` from the config file.
/// * Strips timestamps and target names to keep CLI output clean.
fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .without_time()
        .with_target(false)
        .init();
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => PcfConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PcfConfig::default(),
    };

    init_tracing(&config.logging.level);

    let mut db_config = config.db_config();
    if let Some(backend) = cli.backend {
        db_config.backend = backend;
    }
    if let Some(db) = cli.db {
        db_config.connection_string = db;
    }

    debug!("connecting to {} backend", db_config.backend);
    let registry = app::build_registry();
    let repo = registry
        .create(&db_config)
        .await
        .with_context(|| format!("opening {} backend", db_config.backend))?;

    let mut session = PcfSession::new(config.history_config(), Arc::new(SystemClock));
    let poller = CalculationPoller::new(config.poll_config());
    let options = WizardOptions {
        product_id: cli.product,
        query: cli.query,
        bom_csv: cli.bom,
        out_dir: cli.out,
    };

    let outcome = app::run_wizard(repo.as_ref(), &mut session, &poller, &options)
        .await
        .context("wizard run failed")?;

    if let Some(paths) = &outcome.export {
        info!("wrote {} and {}", paths.bom.display(), paths.results.display());
    }
    Ok(())
}
