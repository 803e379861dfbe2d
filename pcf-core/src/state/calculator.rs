//! Product selection, BOM contents and calculation results.

use std::sync::Arc;

use tracing::{debug, warn};

use super::clock::{Clock, SystemClock};
use super::error::StateError;
use super::history::{HistoryConfig, HistoryEngine};
use crate::models::{BomItem, BomItemPatch, Calculation, CalculationStatus};
use crate::validation::{BomReport, validate_bom};

/// Owner of the BOM being edited.
///
/// Every BOM mutation hands the pre-mutation list to the history engine
/// before applying the change, then recomputes `is_valid`. Quantity edits on
/// the same item are coalesced; adds, removes and bulk replacements are
/// always their own undo step.
#[derive(Debug)]
pub struct CalculatorState {
    selected_product_id: Option<String>,
    bom_items: Vec<BomItem>,
    calculation: Option<Calculation>,
    is_valid: bool,
    has_unsaved_changes: bool,
    is_loading_bom: bool,
    history: HistoryEngine<Vec<BomItem>>,
}

impl CalculatorState {
    pub fn new(
        config: HistoryConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            selected_product_id: None,
            bom_items: Vec::new(),
            calculation: None,
            is_valid: false,
            has_unsaved_changes: false,
            is_loading_bom: false,
            history: HistoryEngine::new(config, clock),
        }
    }

    // Reads

    pub fn selected_product_id(&self) -> Option<&str> {
        self.selected_product_id.as_deref()
    }

    pub fn bom_items(&self) -> &[BomItem] {
        &self.bom_items
    }

    pub fn bom_item(
        &self,
        id: &str,
    ) -> Option<&BomItem> {
        self.bom_items.iter().find(|item| item.id == id)
    }

    pub fn calculation(&self) -> Option<&Calculation> {
        self.calculation.as_ref()
    }

    pub fn calculation_status(&self) -> Option<CalculationStatus> {
        self.calculation.as_ref().map(|calc| calc.status)
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.has_unsaved_changes
    }

    pub fn is_loading_bom(&self) -> bool {
        self.is_loading_bom
    }

    /// Field-level issues behind the current `is_valid` value.
    pub fn validation_report(&self) -> BomReport {
        validate_bom(&self.bom_items)
    }

    pub fn history(&self) -> &HistoryEngine<Vec<BomItem>> {
        &self.history
    }

    // Non-BOM setters (not undoable)

    pub fn set_selected_product_id(
        &mut self,
        product_id: Option<String>,
    ) {
        debug!(product_id = ?product_id, "product selected");
        self.selected_product_id = product_id;
    }

    pub fn set_loading_bom(
        &mut self,
        loading: bool,
    ) {
        self.is_loading_bom = loading;
    }

    /// Replaces the calculation result. Not part of the BOM history.
    pub fn set_calculation(
        &mut self,
        calculation: Option<Calculation>,
    ) {
        if let Some(calc) = &calculation {
            debug!(id = %calc.id, status = calc.status.as_str(), "calculation updated");
            if calc.status == CalculationStatus::Failed {
                warn!(
                    id = %calc.id,
                    error = calc.error_message.as_deref().unwrap_or("unknown error"),
                    "calculation failed"
                );
            }
        }
        self.calculation = calculation;
    }

    /// Clears the unsaved-changes flag once the BOM has been persisted.
    pub fn mark_saved(&mut self) {
        self.has_unsaved_changes = false;
    }

    // BOM mutations

    /// Appends `item` to the end of the list.
    ///
    /// # Errors
    ///
    /// * [`StateError::EmptyId`] if the item has no id.
    /// * [`StateError::DuplicateId`] if the id is already in the list.
    pub fn add_bom_item(
        &mut self,
        item: BomItem,
    ) -> Result<(), StateError> {
        if item.id.is_empty() {
            return Err(StateError::EmptyId);
        }
        if self.position(&item.id).is_some() {
            return Err(StateError::DuplicateId { id: item.id });
        }

        self.history.record(self.bom_items.clone());
        debug!(id = %item.id, name = %item.name, "add BOM item");
        self.bom_items.push(item);
        self.after_bom_change();
        Ok(())
    }

    /// Removes the item with `id` and returns it. Undo puts it back at the
    /// same position.
    ///
    /// # Errors
    ///
    /// [`StateError::UnknownItem`] if no item has that id.
    pub fn remove_bom_item(
        &mut self,
        id: &str,
    ) -> Result<BomItem, StateError> {
        let index = self.require_position(id)?;

        self.history.record(self.bom_items.clone());
        let removed = self.bom_items.remove(index);
        debug!(id, index, "remove BOM item");
        self.after_bom_change();
        Ok(removed)
    }

    /// Shallow-merges `patch` into the item with `id`.
    ///
    /// Values are stored even if they break a validation rule; `is_valid`
    /// reflects the result. Rapid edits to the same item within the
    /// debounce window share one undo step. An empty patch changes nothing
    /// and records nothing.
    ///
    /// # Errors
    ///
    /// [`StateError::UnknownItem`] if no item has that id.
    pub fn update_bom_item(
        &mut self,
        id: &str,
        patch: &BomItemPatch,
    ) -> Result<(), StateError> {
        let index = self.require_position(id)?;
        if patch.is_empty() {
            return Ok(());
        }

        self.history
            .record_coalesced(self.bom_items.clone(), id);
        self.bom_items[index].apply(patch);
        debug!(id, "update BOM item");
        self.after_bom_change();
        Ok(())
    }

    /// Replaces the whole list. Always its own undo step; follow with
    /// [`Self::clear_history`] when the new list is a fresh baseline.
    pub fn set_bom_items(
        &mut self,
        items: Vec<BomItem>,
    ) {
        self.history.record(self.bom_items.clone());
        debug!(count = items.len(), "replace BOM items");
        self.bom_items = items;
        self.after_bom_change();
    }

    // History

    /// Restores the BOM from before the latest undo step. Returns `false`
    /// when there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.history.undo(self.bom_items.clone()) {
            Some(previous) => {
                self.bom_items = previous;
                self.after_bom_change();
                true
            }
            None => false,
        }
    }

    /// Re-applies the latest undone step. Returns `false` when there was
    /// nothing to redo.
    pub fn redo(&mut self) -> bool {
        match self.history.redo(self.bom_items.clone()) {
            Some(next) => {
                self.bom_items = next;
                self.after_bom_change();
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn clear_history(&mut self) {
        self.history.clear_history();
    }

    /// Back to the empty start state, history included.
    pub fn reset(&mut self) {
        self.selected_product_id = None;
        self.bom_items.clear();
        self.calculation = None;
        self.has_unsaved_changes = false;
        self.is_loading_bom = false;
        self.history.clear_history();
        self.is_valid = validate_bom(&self.bom_items).is_valid();
        debug!("calculator state reset");
    }

    fn position(
        &self,
        id: &str,
    ) -> Option<usize> {
        self.bom_items.iter().position(|item| item.id == id)
    }

    fn require_position(
        &self,
        id: &str,
    ) -> Result<usize, StateError> {
        if id.is_empty() {
            return Err(StateError::EmptyId);
        }
        self.position(id).ok_or_else(|| {
            warn!(id, "BOM item not found");
            StateError::UnknownItem { id: id.to_string() }
        })
    }

    fn after_bom_change(&mut self) {
        self.is_valid = validate_bom(&self.bom_items).is_valid();
        self.has_unsaved_changes = true;
    }
}

impl Default for CalculatorState {
    fn default() -> Self {
        Self::new(HistoryConfig::default(), Arc::new(SystemClock))
    }
}
