//! CSV export of a finished wizard run.
//!
//! Two files are produced: `bom.csv` with the BOM exactly as it was
//! calculated (importable again through [`crate::bom_csv`]) and
//! `results.csv` with the total and per-category breakdown.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use pcf_core::calculations::EmissionBreakdown;
use pcf_core::models::{BomItem, ExportSnapshot};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

pub const BOM_FILE_NAME: &str = "bom.csv";
pub const RESULTS_FILE_NAME: &str = "results.csv";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Serialize)]
struct BomRow<'a> {
    id: &'a str,
    name: &'a str,
    quantity: Decimal,
    unit: &'a str,
    category: &'a str,
    emission_factor_id: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct ResultRow<'a> {
    product_id: Option<&'a str>,
    product_name: Option<&'a str>,
    calculation_id: Option<&'a str>,
    status: Option<&'a str>,
    category: &'a str,
    co2e_kg: Option<Decimal>,
    percent: Option<Decimal>,
}

/// Where [`export_to_dir`] wrote its files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    pub bom: PathBuf,
    pub results: PathBuf,
}

pub fn write_bom_csv<W: Write>(
    writer: W,
    items: &[BomItem],
) -> Result<(), ExportError> {
    let mut csv = csv::Writer::from_writer(writer);
    for item in items {
        csv.serialize(BomRow {
            id: &item.id,
            name: &item.name,
            quantity: item.quantity,
            unit: &item.unit,
            category: item.category.as_str(),
            emission_factor_id: item.emission_factor_id.as_deref(),
        })?;
    }
    csv.flush()?;
    Ok(())
}

/// One `total` row followed by one row per non-zero category.
///
/// Figures are written without trailing zeros.
///
/// Without a completed calculation only the `total` row is written, with
/// empty figures.
pub fn write_results_csv<W: Write>(
    writer: W,
    snapshot: &ExportSnapshot,
) -> Result<(), ExportError> {
    let mut csv = csv::Writer::from_writer(writer);

    let product_id = snapshot.product.as_ref().map(|p| p.id.as_str());
    let product_name = snapshot.product.as_ref().map(|p| p.name.as_str());
    let calculation_id = snapshot.calculation.as_ref().map(|c| c.id.as_str());
    let status = snapshot.calculation.as_ref().map(|c| c.status.as_str());
    let breakdown = snapshot
        .calculation
        .as_ref()
        .filter(|c| c.is_completed())
        .and_then(EmissionBreakdown::from_calculation);

    let row = |category: &'static str, co2e_kg: Option<Decimal>, percent: Option<Decimal>| ResultRow {
        product_id,
        product_name,
        calculation_id,
        status,
        category,
        co2e_kg: co2e_kg.map(|d| d.normalize()),
        percent: percent.map(|d| d.normalize()),
    };

    match &breakdown {
        Some(breakdown) => {
            csv.serialize(row(
                "total",
                Some(breakdown.total_co2e_kg),
                Some(Decimal::ONE_HUNDRED),
            ))?;
            for share in &breakdown.shares {
                csv.serialize(row(
                    share.category.as_str(),
                    Some(share.co2e_kg),
                    Some(share.percent),
                ))?;
            }
        }
        None => csv.serialize(row("total", None, None))?,
    }

    csv.flush()?;
    Ok(())
}

/// Write `bom.csv` and `results.csv` into `dir`, creating it if needed.
pub fn export_to_dir(
    dir: &Path,
    snapshot: &ExportSnapshot,
) -> Result<ExportPaths, ExportError> {
    std::fs::create_dir_all(dir)?;

    let paths = ExportPaths {
        bom: dir.join(BOM_FILE_NAME),
        results: dir.join(RESULTS_FILE_NAME),
    };
    write_bom_csv(File::create(&paths.bom)?, &snapshot.bom_items)?;
    write_results_csv(File::create(&paths.results)?, snapshot)?;

    info!(
        bom = %paths.bom.display(),
        results = %paths.results.display(),
        "Export written"
    );
    Ok(paths)
}
