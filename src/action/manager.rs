// ActionManager - Manages undo/redo stacks of compound action lists

use crate::action::state::EditorState;
use crate::action::trait_def::{ActionKind, ActionResult, CompoundAction};
use std::collections::VecDeque;

/// Default maximum number of compound lists to keep in history
const DEFAULT_MAX_HISTORY: usize = 100;

/// Manages action execution and undo/redo functionality
///
/// The ActionManager maintains two stacks:
/// - Undo stack: lists that have been executed and can be undone
/// - Redo stack: lists that have been undone and can be redone
///
/// When a new list is executed:
/// 1. Execute its actions in order
/// 2. Push it onto the undo stack
/// 3. Clear the redo stack (since we're on a new timeline)
///
/// # Memory Management
/// The undo stack is capped; when the limit is reached the oldest list is
/// dropped.
pub struct ActionManager {
    /// Lists that can be undone (most recent at the back)
    undo_stack: VecDeque<CompoundAction>,

    /// Lists that can be redone (most recent at the back)
    redo_stack: VecDeque<CompoundAction>,

    /// Maximum number of lists to keep in history
    max_history: usize,

    /// Set once a copy or cut has run in this session
    clipboard_history: bool,
}

impl ActionManager {
    /// Create a new ActionManager with default settings
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_HISTORY)
    }

    /// Create a new ActionManager with a custom history limit
    pub fn with_capacity(max_history: usize) -> Self {
        let max_history = max_history.max(1);
        Self {
            undo_stack: VecDeque::with_capacity(max_history),
            redo_stack: VecDeque::new(),
            max_history,
            clipboard_history: false,
        }
    }

    /// Execute a list and add it to the undo stack
    ///
    /// Either every action applies or none does: on failure the applied prefix
    /// is undone, nothing is pushed and the redo stack is kept.
    ///
    /// # Errors
    /// Returns the error of the first failing action.
    pub fn execute(&mut self, mut list: CompoundAction, state: &mut EditorState) -> ActionResult<()> {
        if list.is_empty() {
            return Ok(());
        }
        list.execute_all(state)?;
        log::debug!("Executed '{}'", list.description());
        self.push(list);
        Ok(())
    }

    /// Push a list whose actions were already applied live (pointer drags)
    pub fn record(&mut self, list: CompoundAction) {
        if list.is_empty() {
            return;
        }
        log::debug!("Recorded '{}'", list.description());
        self.push(list);
    }

    fn push(&mut self, list: CompoundAction) {
        self.note_clipboard_use(&list);

        self.undo_stack.push_back(list);

        // Clear redo stack (we're on a new timeline now)
        self.redo_stack.clear();

        // Trim history if needed
        while self.undo_stack.len() > self.max_history {
            self.undo_stack.pop_front();
        }
    }

    fn note_clipboard_use(&mut self, list: &CompoundAction) {
        if list.contains_kind(ActionKind::Copy) {
            self.clipboard_history = true;
        }
    }

    /// Undo the last list
    ///
    /// Returns the description of the undone list, or `None` when there is
    /// nothing to undo.
    pub fn undo(&mut self, state: &mut EditorState) -> ActionResult<Option<String>> {
        let Some(mut list) = self.undo_stack.pop_back() else {
            return Ok(None);
        };

        let description = list.description();
        if let Err(e) = list.undo_all(state) {
            log::warn!("Undo of '{}' failed: {}", description, e);
            self.undo_stack.push_back(list);
            return Err(e);
        }
        log::debug!("Undid '{}'", description);

        self.redo_stack.push_back(list);
        Ok(Some(description))
    }

    /// Redo the last undone list
    ///
    /// Returns the description of the redone list, or `None` when there is
    /// nothing to redo.
    pub fn redo(&mut self, state: &mut EditorState) -> ActionResult<Option<String>> {
        let Some(mut list) = self.redo_stack.pop_back() else {
            return Ok(None);
        };

        let description = list.description();
        if let Err(e) = list.redo_all(state) {
            log::warn!("Redo of '{}' failed: {}", description, e);
            self.redo_stack.push_back(list);
            return Err(e);
        }
        log::debug!("Redid '{}'", description);

        self.note_clipboard_use(&list);
        self.undo_stack.push_back(list);
        Ok(Some(description))
    }

    pub fn is_undo_empty(&self) -> bool {
        self.undo_stack.is_empty()
    }

    pub fn is_redo_empty(&self) -> bool {
        self.redo_stack.is_empty()
    }

    /// True once a copy or cut has run since the last `clear`
    pub fn has_clipboard_history(&self) -> bool {
        self.clipboard_history
    }

    /// Get a description of the list that would be undone
    pub fn undo_description(&self) -> Option<String> {
        self.undo_stack.back().map(|list| list.description())
    }

    /// Get a description of the list that would be redone
    pub fn redo_description(&self) -> Option<String> {
        self.redo_stack.back().map(|list| list.description())
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.clipboard_history = false;
    }

    /// Get the number of lists in the undo stack
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    /// Get the number of lists in the redo stack
    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn max_history(&self) -> usize {
        self.max_history
    }
}

impl Default for ActionManager {
    fn default() -> Self {
        Self::new()
    }
}
