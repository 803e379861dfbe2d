//! Backend selection.
//!
//! The binary registers one [`RepositoryFactory`] per backend it ships and
//! opens whichever one [`DbConfig::backend`] names.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tracing::debug;

use super::repository::{PcfRepository, RepositoryError};

/// Which backend to open and how.
///
/// | backend  | connection_string              |
/// |----------|--------------------------------|
/// | `memory` | `:demo:` or a catalog TOML path |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub backend: String,
    /// Interpreted only by the selected backend.
    pub connection_string: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            backend: "memory".to_string(),
            connection_string: ":demo:".to_string(),
        }
    }
}

/// Opens repositories for one named backend.
#[async_trait]
pub trait RepositoryFactory: Send + Sync {
    /// Lowercase name matched against [`DbConfig::backend`].
    fn backend_name(&self) -> &'static str;

    async fn create(&self, config: &DbConfig) -> Result<Box<dyn PcfRepository>, RepositoryError>;
}

/// Backend factories keyed by name.
#[derive(Default)]
pub struct RepositoryRegistry {
    factories: BTreeMap<&'static str, Box<dyn RepositoryFactory>>,
}

impl RepositoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `factory`. A later factory with the same name replaces the
    /// earlier one.
    pub fn register(&mut self, factory: Box<dyn RepositoryFactory>) {
        let name = factory.backend_name();
        if self.factories.insert(name, factory).is_some() {
            debug!(backend = name, "backend factory replaced");
        }
    }

    /// Registered backend names in alphabetical order.
    pub fn available_backends(&self) -> Vec<&'static str> {
        self.factories.keys().copied().collect()
    }

    /// Opens the backend named by `config.backend`.
    ///
    /// # Errors
    ///
    /// [`RepositoryError::Configuration`] for an unregistered backend name,
    /// otherwise whatever the backend's factory reports.
    pub async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn PcfRepository>, RepositoryError> {
        let Some(factory) = self.factories.get(config.backend.as_str()) else {
            return Err(RepositoryError::Configuration(format!(
                "no backend named '{}' (known: {})",
                config.backend,
                self.available_backends().join(", ")
            )));
        };

        debug!(backend = factory.backend_name(), "opening repository");
        factory.create(config).await
    }
}
