//! Undo/redo history with debounced coalescing.
//!
//! The engine stores opaque snapshots of whatever the caller wants to make
//! undoable. Callers hand it the state as it was *before* a mutation; the
//! engine decides whether that snapshot starts a new undo step.
//!
//! # Coalescing
//!
//! [`HistoryEngine::record_coalesced`] opens an edit session keyed by a
//! string (for BOM edits, the item id). While the session is open, further
//! records with the same key do not push anything; they only push the
//! session's deadline out by another debounce window. The session closes
//! when the window elapses without activity, when a record arrives under a
//! different key, or on any plain [`HistoryEngine::record`], undo, redo or
//! clear. A burst of keystrokes therefore becomes one undo step that restores
//! the state from before the first keystroke.
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use pcf_core::state::{HistoryConfig, HistoryEngine, ManualClock};
//!
//! let clock = ManualClock::new();
//! let mut history = HistoryEngine::new(HistoryConfig::default(), Arc::new(clock.clone()));
//!
//! history.record_coalesced(1, "qty");
//! clock.advance(Duration::from_millis(100));
//! history.record_coalesced(2, "qty");
//!
//! assert_eq!(history.undo_depth(), 1);
//! assert_eq!(history.undo(5), Some(1));
//! ```

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use super::clock::{Clock, SystemClock};

/// Tuning for [`HistoryEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Quiet period after which an open edit session is closed.
    pub debounce_window: Duration,
    /// Maximum number of undo steps kept; the oldest is dropped beyond this.
    /// Treated as 1 when zero.
    pub limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            debounce_window: Duration::from_millis(500),
            limit: 100,
        }
    }
}

#[derive(Debug, Clone)]
struct EditSession {
    key: String,
    deadline: Instant,
}

/// Linear undo/redo stacks over snapshots of type `S`.
#[derive(Debug)]
pub struct HistoryEngine<S> {
    undo_stack: VecDeque<S>,
    redo_stack: Vec<S>,
    session: Option<EditSession>,
    config: HistoryConfig,
    clock: Arc<dyn Clock>,
}

impl<S: Clone> HistoryEngine<S> {
    pub fn new(
        config: HistoryConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            session: None,
            config,
            clock,
        }
    }

    pub fn config(&self) -> HistoryConfig {
        self.config
    }

    /// Records `before` as its own undo step and closes any open session.
    pub fn record(
        &mut self,
        before: S,
    ) {
        self.session = None;
        self.push_boundary(before);
    }

    /// Records `before` unless a session with the same `key` is still open,
    /// in which case the session is extended instead.
    pub fn record_coalesced(
        &mut self,
        before: S,
        key: &str,
    ) {
        let now = self.clock.now();
        let deadline = now + self.config.debounce_window;

        if let Some(session) = self.session.as_mut() {
            if session.key == key && now < session.deadline {
                session.deadline = deadline;
                trace!(key, "coalesced into open edit session");
                return;
            }
        }

        self.push_boundary(before);
        self.session = Some(EditSession {
            key: key.to_string(),
            deadline,
        });
    }

    /// Pops the latest undo step, parking `current` on the redo stack.
    ///
    /// Returns the snapshot to restore, or `None` (and leaves `current`
    /// unused) when there is nothing to undo.
    pub fn undo(
        &mut self,
        current: S,
    ) -> Option<S> {
        let previous = self.undo_stack.pop_back()?;
        self.session = None;
        self.redo_stack.push(current);
        debug!(
            undo_depth = self.undo_stack.len(),
            redo_depth = self.redo_stack.len(),
            "undo"
        );
        Some(previous)
    }

    /// Mirror of [`Self::undo`].
    pub fn redo(
        &mut self,
        current: S,
    ) -> Option<S> {
        let next = self.redo_stack.pop()?;
        self.session = None;
        self.push_undo(current);
        debug!(
            undo_depth = self.undo_stack.len(),
            redo_depth = self.redo_stack.len(),
            "redo"
        );
        Some(next)
    }

    /// Empties both stacks and drops any open session without committing it.
    pub fn clear_history(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.session = None;
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Whether a coalescing session is open right now.
    pub fn has_open_session(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| self.clock.now() < session.deadline)
    }

    fn push_boundary(
        &mut self,
        before: S,
    ) {
        self.redo_stack.clear();
        self.push_undo(before);
        debug!(undo_depth = self.undo_stack.len(), "history boundary");
    }

    fn push_undo(
        &mut self,
        snapshot: S,
    ) {
        self.undo_stack.push_back(snapshot);
        // A zero limit still keeps the latest step.
        let limit = self.config.limit.max(1);
        while self.undo_stack.len() > limit {
            self.undo_stack.pop_front();
        }
    }
}

impl<S: Clone> Default for HistoryEngine<S> {
    fn default() -> Self {
        Self::new(HistoryConfig::default(), Arc::new(SystemClock))
    }
}
