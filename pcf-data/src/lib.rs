//! Data-side collaborators for the PCF wizard: the in-memory catalog
//! backend, BOM CSV import and CSV export of results.

pub mod bom_csv;
pub mod catalog;
pub mod export;
pub mod memory;

pub use bom_csv::CsvLoadError;
pub use catalog::{Catalog, CatalogError, EmissionFactor};
pub use export::{ExportError, ExportPaths, export_to_dir};
pub use memory::{InMemoryRepository, MemoryRepositoryFactory};
