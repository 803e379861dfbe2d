mod bom_item;
mod calculation;
mod export_snapshot;
mod product;
mod wizard_step;

pub use bom_item::{BomCategory, BomItem, BomItemPatch, Unit, new_item_id};
pub use calculation::{Calculation, CalculationStatus};
pub use export_snapshot::ExportSnapshot;
pub use product::Product;
pub use wizard_step::WizardStep;
