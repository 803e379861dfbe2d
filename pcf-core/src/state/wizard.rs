//! Step machine for the footprint wizard.
//!
//! Forward navigation is gated: the wizard only moves ahead of the current
//! step once that step has been marked complete. Backward navigation is
//! always allowed. `can_proceed` is derived and recomputed on every
//! transition:
//!
//! | current step | `can_proceed` |
//! |--------------|---------------|
//! | `calculate`  | the observed calculation status is `completed` |
//! | `results`    | always `false` (terminal) |
//! | other        | the validity the orchestrator reported for the step, `true` if none |

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, info, warn};

use crate::models::{CalculationStatus, WizardStep};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardState {
    current_step: WizardStep,
    completed_steps: BTreeSet<WizardStep>,
    can_proceed: bool,
    step_validity: HashMap<WizardStep, bool>,
    calculation_status: Option<CalculationStatus>,
}

impl WizardState {
    pub fn new() -> Self {
        Self {
            current_step: WizardStep::Select,
            completed_steps: BTreeSet::new(),
            can_proceed: false,
            step_validity: HashMap::new(),
            calculation_status: None,
        }
    }

    pub fn current_step(&self) -> WizardStep {
        self.current_step
    }

    pub fn completed_steps(&self) -> &BTreeSet<WizardStep> {
        &self.completed_steps
    }

    pub fn can_proceed(&self) -> bool {
        self.can_proceed
    }

    pub fn is_step_complete(
        &self,
        step: WizardStep,
    ) -> bool {
        self.completed_steps.contains(&step)
    }

    /// Moves to `step`. Returns `false`, leaving the state unchanged, when
    /// `step` is ahead of the current step and the current step is not
    /// complete.
    pub fn set_step(
        &mut self,
        step: WizardStep,
    ) -> bool {
        if step > self.current_step && !self.is_step_complete(self.current_step) {
            warn!(
                from = %self.current_step,
                to = %step,
                "forward navigation blocked by incomplete step"
            );
            return false;
        }

        debug!(from = %self.current_step, to = %step, "wizard step change");
        self.current_step = step;
        self.reconcile();
        true
    }

    /// Advances one step. No-op at the last step.
    pub fn go_next(&mut self) -> bool {
        match self.current_step.next() {
            Some(next) => self.set_step(next),
            None => false,
        }
    }

    /// Goes back one step. No-op at the first step.
    pub fn go_back(&mut self) -> bool {
        match self.current_step.previous() {
            Some(previous) => self.set_step(previous),
            None => false,
        }
    }

    pub fn mark_step_complete(
        &mut self,
        step: WizardStep,
    ) {
        self.completed_steps.insert(step);
    }

    pub fn mark_step_incomplete(
        &mut self,
        step: WizardStep,
    ) {
        self.completed_steps.remove(&step);
    }

    /// Records the orchestrator's validator result for a non-calculate step.
    pub fn set_step_validity(
        &mut self,
        step: WizardStep,
        valid: bool,
    ) {
        self.step_validity.insert(step, valid);
        if step == self.current_step {
            self.reconcile();
        }
    }

    /// Feeds a new calculation status into the machine.
    ///
    /// When the status becomes `completed` while on the calculate step, the
    /// step is marked complete and the wizard moves to results in the same
    /// call. Returns whether that auto-advance happened.
    pub fn observe_calculation(
        &mut self,
        status: Option<CalculationStatus>,
    ) -> bool {
        self.calculation_status = status;

        if self.current_step != WizardStep::Calculate {
            return false;
        }

        if status == Some(CalculationStatus::Completed) {
            self.completed_steps.insert(WizardStep::Calculate);
            self.current_step = WizardStep::Results;
            self.reconcile();
            info!("calculation completed, advancing to results");
            return true;
        }

        self.reconcile();
        false
    }

    pub fn reset(&mut self) {
        *self = Self::new();
        debug!("wizard state reset");
    }

    fn reconcile(&mut self) {
        self.can_proceed = match self.current_step {
            WizardStep::Calculate => self.calculation_status == Some(CalculationStatus::Completed),
            step if step.is_terminal() => false,
            step => self.step_validity.get(&step).copied().unwrap_or(true),
        };
    }
}

impl Default for WizardState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    /// A wizard already sitting on the calculate step.
    fn on_calculate_step() -> WizardState {
        let mut wizard = WizardState::new();
        wizard.mark_step_complete(WizardStep::Select);
        wizard.set_step(WizardStep::Edit);
        wizard.mark_step_complete(WizardStep::Edit);
        wizard.set_step(WizardStep::Calculate);
        assert_eq!(wizard.current_step(), WizardStep::Calculate);
        wizard
    }

    // =========================================================================
    // navigation gate
    // =========================================================================

    #[test]
    fn starts_on_select_with_nothing_complete() {
        let wizard = WizardState::new();

        assert_eq!(wizard.current_step(), WizardStep::Select);
        assert!(wizard.completed_steps().is_empty());
        assert!(!wizard.can_proceed());
    }

    #[test]
    fn completed_step_unlocks_forward_move() {
        let mut wizard = WizardState::new();
        wizard.mark_step_complete(WizardStep::Select);

        assert!(wizard.set_step(WizardStep::Edit));
        assert_eq!(wizard.current_step(), WizardStep::Edit);
    }

    #[test]
    fn incomplete_step_blocks_forward_move() {
        let mut wizard = WizardState::new();
        wizard.mark_step_complete(WizardStep::Select);
        wizard.set_step(WizardStep::Edit);

        let before = wizard.clone();
        assert!(!wizard.set_step(WizardStep::Calculate));

        assert_eq!(wizard, before);
        assert_eq!(wizard.current_step(), WizardStep::Edit);
    }

    #[test]
    fn go_next_is_blocked_from_fresh_state() {
        let mut wizard = WizardState::new();

        assert!(!wizard.go_next());
        assert_eq!(wizard.current_step(), WizardStep::Select);
    }

    #[test]
    fn backward_moves_are_always_allowed() {
        let mut wizard = on_calculate_step();
        wizard.mark_step_incomplete(WizardStep::Edit);

        assert!(wizard.go_back());
        assert_eq!(wizard.current_step(), WizardStep::Edit);
        assert!(wizard.set_step(WizardStep::Select));
        assert_eq!(wizard.current_step(), WizardStep::Select);
    }

    #[test]
    fn go_back_at_first_step_is_a_no_op() {
        let mut wizard = WizardState::new();

        assert!(!wizard.go_back());
        assert_eq!(wizard.current_step(), WizardStep::Select);
    }

    #[test]
    fn go_next_at_terminal_step_is_a_no_op() {
        let mut wizard = on_calculate_step();
        wizard.observe_calculation(Some(CalculationStatus::Completed));
        wizard.mark_step_complete(WizardStep::Results);

        assert!(!wizard.go_next());
        assert_eq!(wizard.current_step(), WizardStep::Results);
    }

    #[test]
    fn mark_incomplete_only_touches_that_step() {
        let mut wizard = WizardState::new();
        wizard.mark_step_complete(WizardStep::Select);
        wizard.mark_step_complete(WizardStep::Edit);

        wizard.mark_step_incomplete(WizardStep::Select);

        assert!(!wizard.is_step_complete(WizardStep::Select));
        assert!(wizard.is_step_complete(WizardStep::Edit));
        assert_eq!(wizard.current_step(), WizardStep::Select);
    }

    // =========================================================================
    // can_proceed reconciliation
    // =========================================================================

    #[test]
    fn non_calculate_step_defaults_to_can_proceed() {
        let mut wizard = WizardState::new();
        wizard.mark_step_complete(WizardStep::Select);

        wizard.set_step(WizardStep::Edit);

        assert!(wizard.can_proceed());
    }

    #[test]
    fn step_validity_drives_can_proceed() {
        let mut wizard = WizardState::new();
        wizard.mark_step_complete(WizardStep::Select);
        wizard.set_step(WizardStep::Edit);

        wizard.set_step_validity(WizardStep::Edit, false);
        assert!(!wizard.can_proceed());

        wizard.set_step_validity(WizardStep::Edit, true);
        assert!(wizard.can_proceed());
    }

    #[test]
    fn validity_of_other_step_does_not_touch_current() {
        let mut wizard = WizardState::new();
        wizard.set_step_validity(WizardStep::Select, true);

        wizard.set_step_validity(WizardStep::Edit, false);

        assert!(wizard.can_proceed());
    }

    #[test]
    fn calculate_step_can_proceed_only_when_completed() {
        let mut wizard = on_calculate_step();
        assert!(!wizard.can_proceed());

        for status in [
            CalculationStatus::Pending,
            CalculationStatus::InProgress,
            CalculationStatus::Failed,
        ] {
            assert!(!wizard.observe_calculation(Some(status)));
            assert!(!wizard.can_proceed(), "{status:?} must not allow proceeding");
            assert_eq!(wizard.current_step(), WizardStep::Calculate);
        }

        wizard.observe_calculation(None);
        assert!(!wizard.can_proceed());
    }

    #[test]
    fn completed_calculation_auto_advances_to_results() {
        let mut wizard = on_calculate_step();
        wizard.observe_calculation(Some(CalculationStatus::Pending));
        assert!(!wizard.can_proceed());

        let advanced = wizard.observe_calculation(Some(CalculationStatus::Completed));

        assert!(advanced);
        assert!(wizard.is_step_complete(WizardStep::Calculate));
        assert_eq!(wizard.current_step(), WizardStep::Results);
        assert!(!wizard.can_proceed());
    }

    #[test]
    fn completed_calculation_elsewhere_does_not_move_wizard() {
        let mut wizard = WizardState::new();
        wizard.mark_step_complete(WizardStep::Select);
        wizard.set_step(WizardStep::Edit);

        assert!(!wizard.observe_calculation(Some(CalculationStatus::Completed)));
        assert_eq!(wizard.current_step(), WizardStep::Edit);
        assert!(!wizard.is_step_complete(WizardStep::Calculate));
    }

    #[test]
    fn returning_to_calculate_uses_last_observed_status() {
        let mut wizard = on_calculate_step();
        wizard.observe_calculation(Some(CalculationStatus::Completed));

        wizard.go_back();

        assert_eq!(wizard.current_step(), WizardStep::Calculate);
        assert!(wizard.can_proceed());
    }

    #[test]
    fn reset_returns_to_initial_state() {
        let mut wizard = on_calculate_step();
        wizard.observe_calculation(Some(CalculationStatus::Completed));

        wizard.reset();

        assert_eq!(wizard, WizardState::new());
        assert_eq!(wizard.current_step(), WizardStep::Select);
        assert!(wizard.completed_steps().is_empty());
        assert!(!wizard.can_proceed());
    }
}
