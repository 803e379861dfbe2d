//! Presentation-side arithmetic on calculation results.
//!
//! The footprint itself is computed by the backend; this module only slices
//! the returned totals for display and export.

pub mod breakdown;
pub mod common;

pub use breakdown::{CategoryShare, EmissionBreakdown};
