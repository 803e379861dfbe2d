use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Lifecycle of a server-side footprint calculation.
///
/// Transitions observed by the client: `Pending -> InProgress -> Completed | Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl CalculationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// `true` once the backend will not change the status again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calculation {
    pub id: String,
    pub status: CalculationStatus,

    // Results, populated once completed
    pub total_co2e_kg: Option<Decimal>,
    pub materials_co2e: Option<Decimal>,
    pub energy_co2e: Option<Decimal>,
    pub transport_co2e: Option<Decimal>,

    /// Set when `status` is `Failed`.
    pub error_message: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Calculation {
    /// A freshly submitted calculation with no results.
    pub fn pending(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: CalculationStatus::Pending,
            total_co2e_kg: None,
            materials_co2e: None,
            energy_co2e: None,
            transport_co2e: None,
            error_message: None,
            created_at: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == CalculationStatus::Completed
    }
}
