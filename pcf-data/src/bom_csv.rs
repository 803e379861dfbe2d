//! CSV import of BOM lines.
//!
//! ## CSV Format
//!
//! Column order does **not** matter (headers are matched by name). Header
//! names are case-sensitive.
//!
//! | Column               | Required | Type    | Notes |
//! |----------------------|----------|---------|-------|
//! | `id`                 | no       | string  | Generated when absent or empty |
//! | `name`               | yes      | string  | |
//! | `quantity`           | yes      | decimal | e.g. `0.25` |
//! | `unit`               | yes      | string  | `kg g L mL kWh MJ tkm m cm` |
//! | `category`           | yes      | string  | `material`, `energy`, `transport`, `other` |
//! | `emission_factor_id` | no       | string  | Leave cell empty for an unmatched item |
//!
//! Units and ids are imported as written and checked later by BOM
//! validation (unknown units, repeated ids), so a file with a typo still
//! loads and the editor can show what is wrong.
//!
//! ### Example
//!
//! ```csv
//! name,quantity,unit,category,emission_factor_id
//! Cotton,0.20,kg,material,ef-cotton
//! Electricity,1.5,kWh,energy,
//! ```

use std::path::Path;
use std::str::FromStr;

use pcf_core::models::{BomCategory, BomItem, new_item_id};
use rust_decimal::Decimal;
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Serde-compatible row that mirrors the CSV layout exactly
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(default)]
    id: Option<String>,
    name: String,
    quantity: String,
    unit: String,
    category: String,
    #[serde(default)]
    emission_factor_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Public error type
// ---------------------------------------------------------------------------

/// Errors that can occur while loading or converting CSV data.
#[derive(Debug, thiserror::Error)]
pub enum CsvLoadError {
    /// The underlying CSV deserialisation failed (bad structure, missing
    /// required column, etc.).
    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),

    /// A `category` cell is not one of the recognised categories.
    /// `row` is 1-based (header = row 0).
    #[error("unrecognised category '{value}' on row {row}")]
    InvalidCategory { value: String, row: usize },

    /// A `quantity` cell is not a decimal number.
    #[error("invalid quantity '{value}' on row {row}")]
    InvalidQuantity { value: String, row: usize },

    #[error("cannot read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Core loader
// ---------------------------------------------------------------------------

/// Convert a single CSV row into a BomItem.
fn convert_row(
    row: CsvRow,
    row_number: usize,
) -> Result<BomItem, CsvLoadError> {
    let category =
        BomCategory::parse(&row.category).ok_or_else(|| CsvLoadError::InvalidCategory {
            value: row.category.clone(),
            row: row_number,
        })?;

    let quantity = Decimal::from_str(&row.quantity).map_err(|_| CsvLoadError::InvalidQuantity {
        value: row.quantity.clone(),
        row: row_number,
    })?;

    let id = row
        .id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(new_item_id);

    Ok(BomItem {
        id,
        name: row.name,
        quantity,
        unit: row.unit,
        category,
        emission_factor_id: row.emission_factor_id.filter(|ef| !ef.is_empty()),
    })
}

/// Parse CSV text and return the BOM items in file order.
///
/// # Errors
///
/// * [CsvLoadError::Parse] – structurally invalid CSV or a missing column.
/// * [CsvLoadError::InvalidCategory] / [CsvLoadError::InvalidQuantity] –
///   a cell that cannot be converted.
pub fn load_from_str(input: &str) -> Result<Vec<BomItem>, CsvLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All) // tolerate whitespace around values
        .flexible(false) // strict column count
        .from_reader(input.as_bytes());

    reader
        .deserialize::<CsvRow>()
        .enumerate()
        .map(|(idx, result)| {
            let row = result?;
            convert_row(row, idx + 1)
        })
        .collect()
}

/// Read a file from disk and delegate to [load_from_str].
pub fn load_from_file(path: &Path) -> Result<Vec<BomItem>, CsvLoadError> {
    let contents = std::fs::read_to_string(path).map_err(|source| CsvLoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    load_from_str(&contents)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
