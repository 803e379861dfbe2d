//! TOML catalog backing the in-memory repository.
//!
//! ```toml
//! [[emission_factors]]
//! id = "ef-cotton"
//! name = "Cotton fibre"
//! unit = "kg"
//! kg_co2e_per_unit = "5.90"
//!
//! [[products]]
//! id = "prod-tshirt"
//! name = "Organic Cotton T-Shirt"
//! code = "TS-001"
//!
//! [[products.bom]]
//! name = "Cotton fabric"
//! quantity = "0.20"
//! unit = "kg"
//! category = "material"
//! emission_factor_id = "ef-cotton"
//! ```

use std::path::Path;

use pcf_core::models::{BomCategory, BomItem, Product};
use rust_decimal::Decimal;
use serde::Deserialize;

/// Catalog shipped with the crate, used for the `:demo:` connection string.
pub const DEMO_CATALOG: &str = include_str!("../catalogs/demo.toml");

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("cannot read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid catalog: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("duplicate {kind} id '{id}'")]
    DuplicateId { kind: &'static str, id: String },
}

/// kg CO2e per unit of `unit`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EmissionFactor {
    pub id: String,
    pub name: String,
    pub unit: String,
    pub kg_co2e_per_unit: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogBomLine {
    /// Generated from the product id and position when omitted.
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub quantity: Decimal,
    pub unit: String,
    pub category: BomCategory,
    #[serde(default)]
    pub emission_factor_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogProduct {
    pub id: String,
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub bom: Vec<CatalogBomLine>,
}

impl CatalogProduct {
    pub fn product(&self) -> Product {
        Product {
            id: self.id.clone(),
            name: self.name.clone(),
            code: self.code.clone(),
            category: self.category.clone(),
            description: self.description.clone(),
        }
    }

    /// The baseline BOM with stable item ids.
    pub fn bom_items(&self) -> Vec<BomItem> {
        self.bom
            .iter()
            .enumerate()
            .map(|(idx, line)| BomItem {
                id: line
                    .id
                    .clone()
                    .unwrap_or_else(|| format!("{}-{}", self.id, idx + 1)),
                name: line.name.clone(),
                quantity: line.quantity,
                unit: line.unit.clone(),
                category: line.category,
                emission_factor_id: line.emission_factor_id.clone(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub products: Vec<CatalogProduct>,
    #[serde(default)]
    pub emission_factors: Vec<EmissionFactor>,
}

impl Catalog {
    pub fn from_toml_str(input: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = toml::from_str(input)?;
        catalog.check_unique_ids()?;
        Ok(catalog)
    }

    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn demo() -> Result<Self, CatalogError> {
        Self::from_toml_str(DEMO_CATALOG)
    }

    fn check_unique_ids(&self) -> Result<(), CatalogError> {
        let mut seen = std::collections::HashSet::new();
        for product in &self.products {
            if !seen.insert(product.id.as_str()) {
                return Err(CatalogError::DuplicateId {
                    kind: "product",
                    id: product.id.clone(),
                });
            }
        }

        seen.clear();
        for factor in &self.emission_factors {
            if !seen.insert(factor.id.as_str()) {
                return Err(CatalogError::DuplicateId {
                    kind: "emission factor",
                    id: factor.id.clone(),
                });
            }
        }
        Ok(())
    }
}
