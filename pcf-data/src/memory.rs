//! In-memory [`PcfRepository`] over a [`Catalog`].
//!
//! Calculations run synchronously at submit time but are revealed in steps:
//! every `get_calculation` call moves a stored calculation one status
//! forward (`pending` → `in_progress` → final), so a poller sees the same
//! sequence it would from a remote service.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use pcf_core::calculations::common::round_half_up;
use pcf_core::db::{DbConfig, PcfRepository, RepositoryError, RepositoryFactory};
use pcf_core::models::{BomCategory, BomItem, Calculation, CalculationStatus, Product};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::catalog::{Catalog, CatalogProduct, EmissionFactor};

/// Connection string that selects the built-in catalog.
pub const DEMO_CONNECTION: &str = ":demo:";

#[derive(Debug)]
struct StoredCalculation {
    current: Calculation,
    outcome: Calculation,
}

impl StoredCalculation {
    fn advance(&mut self) {
        self.current = match self.current.status {
            CalculationStatus::Pending => Calculation {
                status: CalculationStatus::InProgress,
                ..self.current.clone()
            },
            CalculationStatus::InProgress => self.outcome.clone(),
            CalculationStatus::Completed | CalculationStatus::Failed => return,
        };
    }
}

#[derive(Debug)]
pub struct InMemoryRepository {
    products: Vec<CatalogProduct>,
    factors: HashMap<String, EmissionFactor>,
    calculations: Mutex<HashMap<String, StoredCalculation>>,
    next_calculation: AtomicU64,
}

impl InMemoryRepository {
    pub fn new(catalog: Catalog) -> Self {
        let factors = catalog
            .emission_factors
            .into_iter()
            .map(|factor| (factor.id.clone(), factor))
            .collect();

        Self {
            products: catalog.products,
            factors,
            calculations: Mutex::new(HashMap::new()),
            next_calculation: AtomicU64::new(1),
        }
    }

    fn find_product(&self, id: &str) -> Result<&CatalogProduct, RepositoryError> {
        self.products
            .iter()
            .find(|p| p.id == id)
            .ok_or(RepositoryError::NotFound)
    }

    /// Final state of a calculation over `items`.
    ///
    /// Every item needs a known factor whose unit matches the item's unit;
    /// otherwise the calculation fails and the message names the offenders.
    fn evaluate(&self, id: &str, items: &[BomItem]) -> Calculation {
        let mut materials = Decimal::ZERO;
        let mut energy = Decimal::ZERO;
        let mut transport = Decimal::ZERO;
        let mut other = Decimal::ZERO;
        let mut unresolved = Vec::new();

        for item in items {
            let factor = item
                .emission_factor_id
                .as_deref()
                .and_then(|ef| self.factors.get(ef));

            let factor = match factor {
                Some(f) if f.unit == item.unit => f,
                Some(f) => {
                    unresolved.push(format!("{} ({} vs {})", item.name, item.unit, f.unit));
                    continue;
                }
                None => {
                    unresolved.push(item.name.clone());
                    continue;
                }
            };

            let co2e = item.quantity * factor.kg_co2e_per_unit;
            match item.category {
                BomCategory::Material => materials += co2e,
                BomCategory::Energy => energy += co2e,
                BomCategory::Transport => transport += co2e,
                BomCategory::Other => other += co2e,
            }
        }

        let mut calculation = Calculation {
            created_at: Some(Utc::now()),
            ..Calculation::pending(id)
        };

        if !unresolved.is_empty() {
            calculation.status = CalculationStatus::Failed;
            calculation.error_message = Some(format!(
                "no matching emission factor for: {}",
                unresolved.join(", ")
            ));
            return calculation;
        }

        calculation.status = CalculationStatus::Completed;
        calculation.total_co2e_kg =
            Some(round_half_up(materials + energy + transport + other));
        calculation.materials_co2e = Some(round_half_up(materials));
        calculation.energy_co2e = Some(round_half_up(energy));
        calculation.transport_co2e = Some(round_half_up(transport));
        calculation
    }
}

#[async_trait]
impl PcfRepository for InMemoryRepository {
    async fn search_products(&self, query: &str) -> Result<Vec<Product>, RepositoryError> {
        let needle = query.trim().to_lowercase();
        Ok(self
            .products
            .iter()
            .filter(|p| {
                needle.is_empty()
                    || p.name.to_lowercase().contains(&needle)
                    || p.code.to_lowercase().contains(&needle)
            })
            .map(CatalogProduct::product)
            .collect())
    }

    async fn get_product(&self, id: &str) -> Result<Product, RepositoryError> {
        self.find_product(id).map(CatalogProduct::product)
    }

    async fn get_product_bom(&self, product_id: &str) -> Result<Vec<BomItem>, RepositoryError> {
        self.find_product(product_id).map(CatalogProduct::bom_items)
    }

    async fn submit_calculation(
        &self,
        product_id: &str,
        items: &[BomItem],
    ) -> Result<Calculation, RepositoryError> {
        self.find_product(product_id)?;
        if items.is_empty() {
            return Err(RepositoryError::Backend(
                "cannot calculate an empty BOM".to_string(),
            ));
        }

        let seq = self.next_calculation.fetch_add(1, Ordering::Relaxed);
        let id = format!("calc-{seq}");
        let outcome = self.evaluate(&id, items);
        let current = Calculation {
            created_at: outcome.created_at,
            ..Calculation::pending(id.clone())
        };

        info!(calculation_id = %id, product_id, items = items.len(), "Calculation submitted");

        self.calculations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                id,
                StoredCalculation {
                    current: current.clone(),
                    outcome,
                },
            );
        Ok(current)
    }

    async fn get_calculation(&self, id: &str) -> Result<Calculation, RepositoryError> {
        let mut calculations = self
            .calculations
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let stored = calculations.get_mut(id).ok_or(RepositoryError::NotFound)?;
        stored.advance();
        debug!(calculation_id = id, status = %stored.current.status.as_str(), "Calculation read");
        Ok(stored.current.clone())
    }
}

/// [`RepositoryFactory`] for the `"memory"` backend.
///
/// ```rust,no_run
/// use pcf_core::db::RepositoryRegistry;
/// use pcf_data::MemoryRepositoryFactory;
///
/// let mut registry = RepositoryRegistry::new();
/// registry.register(Box::new(MemoryRepositoryFactory));
/// ```
pub struct MemoryRepositoryFactory;

#[async_trait]
impl RepositoryFactory for MemoryRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    /// Accepted connection strings:
    /// * `":demo:"` for the built-in catalog.
    /// * A path to a TOML catalog file.
    async fn create(&self, config: &DbConfig) -> Result<Box<dyn PcfRepository>, RepositoryError> {
        let loaded = match config.connection_string.as_str() {
            DEMO_CONNECTION => Catalog::demo(),
            path => Catalog::from_file(Path::new(path)),
        };
        let catalog = loaded.map_err(|e| {
            RepositoryError::Configuration(format!("{}: {e}", config.connection_string))
        })?;

        info!(
            source = %config.connection_string,
            products = catalog.products.len(),
            factors = catalog.emission_factors.len(),
            "Catalog loaded"
        );
        Ok(Box::new(InMemoryRepository::new(catalog)))
    }
}
