//! Validation rules for BOM contents.
//!
//! Validation never rejects a mutation. The state layer stores whatever it is
//! given and derives a validity flag from the issues reported here; the UI
//! uses the individual issues for field-level messages.

pub mod bom;

pub use bom::{
    BomIssue, BomReport, MAX_BOM_ITEMS, MAX_NAME_LENGTH, MAX_QUANTITY, MIN_BOM_ITEMS, validate_bom,
    validate_bom_item,
};
