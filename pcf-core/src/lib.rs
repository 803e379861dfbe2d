pub mod calculations;
pub mod db;
pub mod models;
pub mod state;
pub mod validation;

pub use db::{PcfRepository, RepositoryError};
pub use models::*;
pub use state::{CalculatorState, HistoryConfig, HistoryEngine, PcfSession, StateError, WizardState};
