//! BOM schema.
//!
//! # Item rules
//!
//! | Field                | Rule |
//! |----------------------|------|
//! | `name`               | non-empty after trimming, at most 100 characters once trimmed |
//! | `quantity`           | greater than 0 and at most 999,999 |
//! | `unit`               | non-empty, one of `kg g L mL kWh MJ tkm m cm` |
//! | `emission_factor_id` | absent is fine; present must be non-empty |
//!
//! # List rules
//!
//! - between 1 and 100 items
//! - ids unique
//! - names unique after trimming and case folding
//!
//! Items without an emission factor are valid. Whether they can be
//! calculated is the backend's decision.

use std::collections::HashSet;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{BomItem, Unit};

pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_QUANTITY: Decimal = Decimal::from_parts(999_999, 0, 0, false, 0);
pub const MIN_BOM_ITEMS: usize = 1;
pub const MAX_BOM_ITEMS: usize = 100;

/// A single rule violation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BomIssue {
    #[error("item {id}: component name is required")]
    EmptyName { id: String },

    #[error("item {id}: component name must be at most {max} characters, got {len}", max = MAX_NAME_LENGTH)]
    NameTooLong { id: String, len: usize },

    #[error("item {id}: quantity must be greater than 0, got {quantity}")]
    NonPositiveQuantity { id: String, quantity: Decimal },

    #[error("item {id}: quantity must be at most {max}, got {quantity}", max = MAX_QUANTITY)]
    QuantityTooLarge { id: String, quantity: Decimal },

    #[error("item {id}: unit is required")]
    EmptyUnit { id: String },

    #[error("item {id}: unit '{unit}' is not supported")]
    UnknownUnit { id: String, unit: String },

    #[error("item {id}: emission factor id must not be empty")]
    EmptyEmissionFactorId { id: String },

    #[error("item {id}: id is used by another component")]
    DuplicateId { id: String },

    #[error("item {id}: duplicate component name '{name}'")]
    DuplicateName { id: String, name: String },

    #[error("at least {min} component is required", min = MIN_BOM_ITEMS)]
    EmptyList,

    #[error("at most {max} components are allowed, got {count}", max = MAX_BOM_ITEMS)]
    TooManyItems { count: usize },
}

impl BomIssue {
    /// The item the issue belongs to, or `None` for list-level issues.
    pub fn item_id(&self) -> Option<&str> {
        match self {
            Self::EmptyName { id }
            | Self::NameTooLong { id, .. }
            | Self::NonPositiveQuantity { id, .. }
            | Self::QuantityTooLarge { id, .. }
            | Self::EmptyUnit { id }
            | Self::UnknownUnit { id, .. }
            | Self::EmptyEmissionFactorId { id }
            | Self::DuplicateId { id }
            | Self::DuplicateName { id, .. } => Some(id),
            Self::EmptyList | Self::TooManyItems { .. } => None,
        }
    }
}

/// Outcome of validating a whole BOM.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BomReport {
    pub issues: Vec<BomIssue>,
}

impl BomReport {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn issues_for<'a>(
        &'a self,
        item_id: &'a str,
    ) -> impl Iterator<Item = &'a BomIssue> + 'a {
        self.issues
            .iter()
            .filter(move |issue| issue.item_id() == Some(item_id))
    }
}

/// Checks the per-field rules of a single item.
pub fn validate_bom_item(item: &BomItem) -> Vec<BomIssue> {
    let mut issues = Vec::new();
    let id = || item.id.clone();

    let name = item.name.trim();
    if name.is_empty() {
        issues.push(BomIssue::EmptyName { id: id() });
    }
    let len = name.chars().count();
    if len > MAX_NAME_LENGTH {
        issues.push(BomIssue::NameTooLong { id: id(), len });
    }

    if item.quantity <= Decimal::ZERO {
        issues.push(BomIssue::NonPositiveQuantity {
            id: id(),
            quantity: item.quantity,
        });
    } else if item.quantity > MAX_QUANTITY {
        issues.push(BomIssue::QuantityTooLarge {
            id: id(),
            quantity: item.quantity,
        });
    }

    if item.unit.is_empty() {
        issues.push(BomIssue::EmptyUnit { id: id() });
    } else if Unit::parse(&item.unit).is_none() {
        issues.push(BomIssue::UnknownUnit {
            id: id(),
            unit: item.unit.clone(),
        });
    }

    if item.emission_factor_id.as_deref() == Some("") {
        issues.push(BomIssue::EmptyEmissionFactorId { id: id() });
    }

    issues
}

/// Checks every item plus the list-level rules.
pub fn validate_bom(items: &[BomItem]) -> BomReport {
    let mut issues = Vec::new();

    if items.len() < MIN_BOM_ITEMS {
        issues.push(BomIssue::EmptyList);
    } else if items.len() > MAX_BOM_ITEMS {
        issues.push(BomIssue::TooManyItems { count: items.len() });
    }

    let mut seen_ids = HashSet::with_capacity(items.len());
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        issues.extend(validate_bom_item(item));

        if !seen_ids.insert(item.id.as_str()) {
            issues.push(BomIssue::DuplicateId {
                id: item.id.clone(),
            });
        }

        let key = normalized_name(&item.name);
        if key.is_empty() {
            continue;
        }
        if !seen.insert(key) {
            issues.push(BomIssue::DuplicateName {
                id: item.id.clone(),
                name: item.name.trim().to_string(),
            });
        }
    }

    BomReport { issues }
}

fn normalized_name(name: &str) -> String {
    name.trim().to_lowercase()
}
