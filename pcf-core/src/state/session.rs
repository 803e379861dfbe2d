//! Composition root for one wizard run.
//!
//! [`CalculatorState`] and [`WizardState`] know nothing about each other.
//! The session owns one of each and performs the cross-store bookkeeping:
//! it reports step validity to the wizard after every BOM or selection
//! change, and forwards every calculation update to the wizard so the
//! calculate step can auto-advance.

use std::sync::Arc;

use super::calculator::CalculatorState;
use super::clock::{Clock, SystemClock};
use super::error::StateError;
use super::history::HistoryConfig;
use super::wizard::WizardState;
use crate::models::{BomItem, BomItemPatch, Calculation, ExportSnapshot, Product, WizardStep};

#[derive(Debug)]
pub struct PcfSession {
    calculator: CalculatorState,
    wizard: WizardState,
}

impl PcfSession {
    pub fn new(
        config: HistoryConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let mut session = Self {
            calculator: CalculatorState::new(config, clock),
            wizard: WizardState::new(),
        };
        session.sync_step_validity();
        session
    }

    pub fn calculator(&self) -> &CalculatorState {
        &self.calculator
    }

    pub fn wizard(&self) -> &WizardState {
        &self.wizard
    }

    // Navigation

    pub fn set_step(
        &mut self,
        step: WizardStep,
    ) -> bool {
        self.wizard.set_step(step)
    }

    pub fn go_next(&mut self) -> bool {
        self.wizard.go_next()
    }

    pub fn go_back(&mut self) -> bool {
        self.wizard.go_back()
    }

    pub fn mark_step_complete(
        &mut self,
        step: WizardStep,
    ) {
        self.wizard.mark_step_complete(step);
    }

    pub fn mark_step_incomplete(
        &mut self,
        step: WizardStep,
    ) {
        self.wizard.mark_step_incomplete(step);
    }

    // Selection and BOM

    pub fn select_product(
        &mut self,
        product_id: Option<String>,
    ) {
        self.calculator.set_selected_product_id(product_id);
        self.sync_step_validity();
    }

    pub fn set_loading_bom(
        &mut self,
        loading: bool,
    ) {
        self.calculator.set_loading_bom(loading);
    }

    pub fn add_bom_item(
        &mut self,
        item: BomItem,
    ) -> Result<(), StateError> {
        let result = self.calculator.add_bom_item(item);
        self.sync_step_validity();
        result
    }

    pub fn remove_bom_item(
        &mut self,
        id: &str,
    ) -> Result<BomItem, StateError> {
        let result = self.calculator.remove_bom_item(id);
        self.sync_step_validity();
        result
    }

    pub fn update_bom_item(
        &mut self,
        id: &str,
        patch: &BomItemPatch,
    ) -> Result<(), StateError> {
        let result = self.calculator.update_bom_item(id, patch);
        self.sync_step_validity();
        result
    }

    pub fn set_bom_items(
        &mut self,
        items: Vec<BomItem>,
    ) {
        self.calculator.set_bom_items(items);
        self.sync_step_validity();
    }

    /// Loads a server-provided BOM as the new baseline: replaces the list,
    /// then clears history so the load itself cannot be undone.
    pub fn load_baseline_bom(
        &mut self,
        items: Vec<BomItem>,
    ) {
        self.calculator.set_bom_items(items);
        self.calculator.clear_history();
        self.calculator.mark_saved();
        self.calculator.set_loading_bom(false);
        self.sync_step_validity();
    }

    pub fn undo(&mut self) -> bool {
        let undone = self.calculator.undo();
        self.sync_step_validity();
        undone
    }

    pub fn redo(&mut self) -> bool {
        let redone = self.calculator.redo();
        self.sync_step_validity();
        redone
    }

    pub fn can_undo(&self) -> bool {
        self.calculator.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.calculator.can_redo()
    }

    pub fn clear_history(&mut self) {
        self.calculator.clear_history();
    }

    // Calculation

    /// Stores the calculation and reconciles the wizard in the same call.
    /// Returns `true` if the wizard auto-advanced to results.
    pub fn set_calculation(
        &mut self,
        calculation: Option<Calculation>,
    ) -> bool {
        let status = calculation.as_ref().map(|calc| calc.status);
        self.calculator.set_calculation(calculation);
        self.wizard.observe_calculation(status)
    }

    // Lifecycle

    /// Resets both stores, history included.
    pub fn reset(&mut self) {
        self.calculator.reset();
        self.wizard.reset();
        self.sync_step_validity();
    }

    /// Detached copy of what the export collaborator needs.
    pub fn export_snapshot(
        &self,
        product: Option<Product>,
    ) -> ExportSnapshot {
        ExportSnapshot {
            product,
            bom_items: self.calculator.bom_items().to_vec(),
            calculation: self.calculator.calculation().cloned(),
        }
    }

    fn sync_step_validity(&mut self) {
        self.wizard.set_step_validity(
            WizardStep::Select,
            self.calculator.selected_product_id().is_some(),
        );
        self.wizard
            .set_step_validity(WizardStep::Edit, self.calculator.is_valid());
    }
}

impl Default for PcfSession {
    fn default() -> Self {
        Self::new(HistoryConfig::default(), Arc::new(SystemClock))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{BomCategory, CalculationStatus, Unit};
    use crate::state::ManualClock;

    fn session() -> (PcfSession, ManualClock) {
        let clock = ManualClock::new();
        let session = PcfSession::new(HistoryConfig::default(), Arc::new(clock.clone()));
        (session, clock)
    }

    fn calc(status: CalculationStatus) -> Calculation {
        Calculation {
            status,
            ..Calculation::pending("calc-1")
        }
    }

    /// Drives a session through select and edit onto the calculate step.
    fn at_calculate_step() -> PcfSession {
        let (mut session, _) = session();
        session.select_product(Some("prod-1".to_string()));
        session.mark_step_complete(WizardStep::Select);
        assert!(session.go_next());
        session.load_baseline_bom(vec![BomItem::new(
            "Cotton",
            dec!(1),
            Unit::Kilogram,
            BomCategory::Material,
        )]);
        session.mark_step_complete(WizardStep::Edit);
        assert!(session.go_next());
        session
    }

    #[test]
    fn select_validity_follows_product_selection() {
        let (mut session, _) = session();

        session.select_product(Some("prod-1".to_string()));
        assert!(session.wizard().can_proceed());

        session.select_product(None);
        assert!(!session.wizard().can_proceed());
    }

    #[test]
    fn edit_validity_follows_bom_validity() {
        let (mut session, _) = session();
        session.mark_step_complete(WizardStep::Select);
        session.go_next();
        assert!(!session.wizard().can_proceed());

        let item = BomItem::new("Cotton", dec!(1), Unit::Kilogram, BomCategory::Material);
        let id = item.id.clone();
        session.add_bom_item(item).unwrap();
        assert!(session.wizard().can_proceed());

        session
            .update_bom_item(&id, &BomItemPatch::quantity(dec!(0)))
            .unwrap();
        assert!(!session.wizard().can_proceed());

        session.undo();
        assert!(session.wizard().can_proceed());
    }

    #[test]
    fn baseline_load_is_not_undoable() {
        let (mut session, _) = session();
        session.set_loading_bom(true);

        session.load_baseline_bom(vec![BomItem::new(
            "Cotton",
            dec!(1),
            Unit::Kilogram,
            BomCategory::Material,
        )]);

        assert!(!session.can_undo());
        assert!(!session.calculator().has_unsaved_changes());
        assert!(!session.calculator().is_loading_bom());
        assert_eq!(session.calculator().bom_items().len(), 1);
    }

    #[test]
    fn pending_then_completed_calculation_advances_atomically() {
        let mut session = at_calculate_step();

        assert!(!session.set_calculation(Some(calc(CalculationStatus::Pending))));
        assert!(!session.wizard().can_proceed());

        let completed = Calculation {
            total_co2e_kg: Some(dec!(2.5)),
            ..calc(CalculationStatus::Completed)
        };
        assert!(session.set_calculation(Some(completed)));

        assert!(session.wizard().is_step_complete(WizardStep::Calculate));
        assert_eq!(session.wizard().current_step(), WizardStep::Results);
        assert!(!session.wizard().can_proceed());
        assert_eq!(
            session.calculator().calculation().and_then(|c| c.total_co2e_kg),
            Some(dec!(2.5))
        );
    }

    #[test]
    fn failed_calculation_stays_on_calculate_step() {
        let mut session = at_calculate_step();

        let failed = Calculation {
            error_message: Some("emission factor missing".to_string()),
            ..calc(CalculationStatus::Failed)
        };
        session.set_calculation(Some(failed));

        assert_eq!(session.wizard().current_step(), WizardStep::Calculate);
        assert!(!session.wizard().can_proceed());
        assert!(!session.wizard().is_step_complete(WizardStep::Calculate));
    }

    #[test]
    fn reset_clears_both_stores() {
        let (mut session, clock) = session();
        session.select_product(Some("prod-1".to_string()));
        session.mark_step_complete(WizardStep::Select);
        session.go_next();
        for name in ["Cotton", "Wool", "Linen"] {
            session
                .add_bom_item(BomItem::new(name, dec!(1), Unit::Kilogram, BomCategory::Material))
                .unwrap();
            clock.advance(Duration::from_millis(600));
        }
        session.undo();

        session.reset();

        assert!(session.calculator().bom_items().is_empty());
        assert!(!session.can_undo());
        assert!(!session.can_redo());
        assert_eq!(session.wizard().current_step(), WizardStep::Select);
        assert!(session.wizard().completed_steps().is_empty());
        assert!(!session.wizard().can_proceed());
    }

    #[test]
    fn export_snapshot_is_detached_copy() {
        let mut session = at_calculate_step();
        session.set_calculation(Some(calc(CalculationStatus::Completed)));

        let snapshot = session.export_snapshot(None);
        session.reset();

        assert_eq!(snapshot.bom_items.len(), 1);
        assert_eq!(
            snapshot.calculation.map(|c| c.status),
            Some(CalculationStatus::Completed)
        );
    }
}
