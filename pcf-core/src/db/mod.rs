pub mod factory;
pub mod poller;
pub mod repository;

pub use factory::{DbConfig, RepositoryFactory, RepositoryRegistry};
pub use poller::{CalculationPoller, PollConfig, PollError};
pub use repository::{PcfRepository, RepositoryError};
