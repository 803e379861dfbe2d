//! Client-side state for the footprint wizard.
//!
//! * [`HistoryEngine`]: generic undo/redo with debounced coalescing.
//! * [`CalculatorState`]: selected product, BOM, calculation result.
//! * [`WizardState`]: step navigation and the `can_proceed` gate.
//! * [`PcfSession`]: wires the two stores together.

mod calculator;
mod clock;
mod error;
mod history;
mod session;
mod wizard;

pub use calculator::CalculatorState;
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::StateError;
pub use history::{HistoryConfig, HistoryEngine};
pub use session::PcfSession;
pub use wizard::WizardState;
