use serde::{Deserialize, Serialize};

use super::{BomItem, Calculation, Product};

/// Everything the export collaborator needs, detached from the live session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSnapshot {
    pub product: Option<Product>,
    pub bom_items: Vec<BomItem>,
    pub calculation: Option<Calculation>,
}
