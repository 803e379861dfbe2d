//! Per-category view of a completed calculation for the results step.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::common::{percent_of, round_half_up};
use crate::models::{BomCategory, Calculation};

/// One row of the results breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub category: BomCategory,
    pub co2e_kg: Decimal,
    /// Percentage of the total, rounded half-up to two places.
    pub percent: Decimal,
}

/// Results split into materials, energy, transport and the unattributed rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmissionBreakdown {
    pub total_co2e_kg: Decimal,
    pub shares: Vec<CategoryShare>,
}

impl EmissionBreakdown {
    /// Builds the breakdown, or `None` if the calculation has no total yet.
    ///
    /// Whatever part of the total is not covered by the materials, energy
    /// and transport figures is reported under [`BomCategory::Other`].
    /// Categories with a zero contribution are omitted.
    pub fn from_calculation(calculation: &Calculation) -> Option<Self> {
        let total = calculation.total_co2e_kg?;

        let materials = calculation.materials_co2e.unwrap_or_default();
        let energy = calculation.energy_co2e.unwrap_or_default();
        let transport = calculation.transport_co2e.unwrap_or_default();
        let other = (total - materials - energy - transport).max(Decimal::ZERO);

        let shares = [
            (BomCategory::Material, materials),
            (BomCategory::Energy, energy),
            (BomCategory::Transport, transport),
            (BomCategory::Other, other),
        ]
        .into_iter()
        .filter(|(_, value)| !value.is_zero())
        .map(|(category, value)| CategoryShare {
            category,
            co2e_kg: round_half_up(value),
            percent: percent_of(value, total),
        })
        .collect();

        Some(Self {
            total_co2e_kg: round_half_up(total),
            shares,
        })
    }

    /// The largest contributor, if any.
    pub fn hotspot(&self) -> Option<&CategoryShare> {
        self.shares.iter().max_by_key(|share| share.co2e_kg)
    }
}
