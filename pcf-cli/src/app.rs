//! Non-interactive wizard run: select, edit, calculate, results.

use std::path::PathBuf;

use pcf_core::calculations::EmissionBreakdown;
use pcf_core::db::{CalculationPoller, PcfRepository, PollError, RepositoryError, RepositoryRegistry};
use pcf_core::models::{Calculation, CalculationStatus, Product, WizardStep};
use pcf_core::state::PcfSession;
use pcf_core::validation::BomIssue;
use pcf_data::bom_csv::{self, CsvLoadError};
use pcf_data::export::{ExportError, ExportPaths, export_to_dir};
use pcf_data::MemoryRepositoryFactory;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Registry with every backend this binary ships.
pub fn build_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(MemoryRepositoryFactory));
    registry
}

/// What to run the wizard on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WizardOptions {
    pub product_id: Option<String>,
    pub query: Option<String>,
    /// Replaces the catalog BOM after it is loaded.
    pub bom_csv: Option<PathBuf>,
    pub out_dir: Option<PathBuf>,
}

#[derive(Debug)]
pub struct WizardOutcome {
    pub product: Product,
    pub calculation: Calculation,
    pub breakdown: Option<EmissionBreakdown>,
    pub export: Option<ExportPaths>,
}

#[derive(Debug, Error)]
pub enum WizardError {
    #[error("either a product id or a search query is required")]
    NoProductGiven,

    #[error("no product matches '{0}'")]
    NoProductMatch(String),

    #[error("BOM has {} validation issue(s)", .0.len())]
    InvalidBom(Vec<BomIssue>),

    #[error("wizard refused to leave the {0} step")]
    Blocked(WizardStep),

    #[error("calculation {id} failed: {message}")]
    CalculationFailed { id: String, message: String },

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Poll(#[from] PollError),

    #[error("BOM import failed: {0}")]
    Import(#[from] CsvLoadError),

    #[error("export failed: {0}")]
    Export(#[from] ExportError),
}

/// Drives `session` through all four steps against `repo`.
///
/// The session must be fresh (on the select step).
pub async fn run_wizard(
    repo: &dyn PcfRepository,
    session: &mut PcfSession,
    poller: &CalculationPoller,
    options: &WizardOptions,
) -> Result<WizardOutcome, WizardError> {
    // ── select ───────────────────────────────────────────────────────────
    let product = resolve_product(repo, options).await?;
    info!(product_id = %product.id, name = %product.name, "Product selected");
    session.select_product(Some(product.id.clone()));
    advance(session)?;

    // ── edit ─────────────────────────────────────────────────────────────
    session.set_loading_bom(true);
    let baseline = match repo.get_product_bom(&product.id).await {
        Ok(items) => items,
        Err(e) => {
            session.set_loading_bom(false);
            return Err(e.into());
        }
    };
    debug!(items = baseline.len(), "Baseline BOM loaded");
    session.load_baseline_bom(baseline);

    if let Some(path) = &options.bom_csv {
        let imported = bom_csv::load_from_file(path)?;
        info!(path = %path.display(), items = imported.len(), "BOM imported");
        session.set_bom_items(imported);
    }

    let report = session.calculator().validation_report();
    if !report.is_valid() {
        for issue in &report.issues {
            error!(item_id = issue.item_id().unwrap_or("-"), "{issue}");
        }
        return Err(WizardError::InvalidBom(report.issues));
    }
    advance(session)?;

    // ── calculate ────────────────────────────────────────────────────────
    let submitted = repo
        .submit_calculation(&product.id, session.calculator().bom_items())
        .await?;
    info!(calculation_id = %submitted.id, "Calculation submitted");
    session.set_calculation(Some(submitted.clone()));

    let calculation = poller
        .poll(repo, &submitted.id, |calc| {
            session.set_calculation(Some(calc.clone()));
        })
        .await?;

    if calculation.status == CalculationStatus::Failed {
        let message = calculation
            .error_message
            .clone()
            .unwrap_or_else(|| "no reason given".to_string());
        warn!(calculation_id = %calculation.id, %message, "Calculation failed");
        return Err(WizardError::CalculationFailed {
            id: calculation.id,
            message,
        });
    }

    // ── results ──────────────────────────────────────────────────────────
    if session.wizard().current_step() != WizardStep::Results {
        return Err(WizardError::Blocked(session.wizard().current_step()));
    }

    let breakdown = EmissionBreakdown::from_calculation(&calculation);
    if let Some(breakdown) = &breakdown {
        log_breakdown(breakdown);
    }

    let export = match &options.out_dir {
        Some(dir) => Some(export_to_dir(dir, &session.export_snapshot(Some(product.clone())))?),
        None => None,
    };

    Ok(WizardOutcome {
        product,
        calculation,
        breakdown,
        export,
    })
}

async fn resolve_product(
    repo: &dyn PcfRepository,
    options: &WizardOptions,
) -> Result<Product, WizardError> {
    if let Some(id) = &options.product_id {
        return Ok(repo.get_product(id).await?);
    }

    let query = options.query.as_deref().ok_or(WizardError::NoProductGiven)?;
    let hits = repo.search_products(query).await?;
    debug!(query, hits = hits.len(), "Product search");
    hits.into_iter()
        .next()
        .ok_or_else(|| WizardError::NoProductMatch(query.to_string()))
}

/// Marks the current step complete and moves to the next one.
fn advance(session: &mut PcfSession) -> Result<(), WizardError> {
    let step = session.wizard().current_step();
    if !session.wizard().can_proceed() {
        return Err(WizardError::Blocked(step));
    }
    session.mark_step_complete(step);
    if !session.go_next() {
        return Err(WizardError::Blocked(step));
    }
    Ok(())
}

fn log_breakdown(breakdown: &EmissionBreakdown) {
    info!(total_co2e_kg = %breakdown.total_co2e_kg, "Product carbon footprint");
    for share in &breakdown.shares {
        info!(
            category = share.category.as_str(),
            co2e_kg = %share.co2e_kg,
            percent = %share.percent,
            "  share"
        );
    }
    if let Some(hotspot) = breakdown.hotspot() {
        info!(category = hotspot.category.as_str(), "Largest contributor");
    }
}
