use serde::{Deserialize, Serialize};

/// Catalog entry the wizard's first step selects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub code: String,
    pub category: Option<String>,
    pub description: Option<String>,
}
