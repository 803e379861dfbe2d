use async_trait::async_trait;
use thiserror::Error;

use crate::models::{BomItem, Calculation, Product};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Data source behind the wizard: product catalog, BOMs and the
/// calculation service.
#[async_trait]
pub trait PcfRepository: Send + Sync {
    // Products
    async fn search_products(&self, query: &str) -> Result<Vec<Product>, RepositoryError>;
    async fn get_product(&self, id: &str) -> Result<Product, RepositoryError>;

    // Bill of materials
    async fn get_product_bom(&self, product_id: &str) -> Result<Vec<BomItem>, RepositoryError>;

    // Calculations
    async fn submit_calculation(
        &self,
        product_id: &str,
        items: &[BomItem],
    ) -> Result<Calculation, RepositoryError>;

    async fn get_calculation(&self, id: &str) -> Result<Calculation, RepositoryError>;
}
