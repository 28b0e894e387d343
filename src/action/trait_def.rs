// Action trait definition

use crate::action::state::EditorState;
use crate::clipboard::ClipboardError;
use crate::composition::CompositionError;
use serde::Serialize;
use std::fmt;

/// Result type for action operations
pub type ActionResult<T> = Result<T, ActionError>;

/// Errors that can occur while applying or reverting actions
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error(transparent)]
    Composition(#[from] CompositionError),

    #[error(transparent)]
    Clipboard(#[from] ClipboardError),

    /// Undo operation failed
    #[error("Undo failed: {0}")]
    UndoFailed(String),
}

/// Closed set of action kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ActionKind {
    Add,
    Delete,
    Move,
    LengthChange,
    Select,
    Unselect,
    ChangeInstrument,
    Group,
    Ungroup,
    Copy,
    Paste,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActionKind::Add => "Add",
            ActionKind::Delete => "Delete",
            ActionKind::Move => "Move",
            ActionKind::LengthChange => "Change Length",
            ActionKind::Select => "Select",
            ActionKind::Unselect => "Unselect",
            ActionKind::ChangeInstrument => "Change Instrument",
            ActionKind::Group => "Group",
            ActionKind::Ungroup => "Ungroup",
            ActionKind::Copy => "Copy",
            ActionKind::Paste => "Paste",
        };
        write!(f, "{}", name)
    }
}

/// Trait for reversible edits of the composition
///
/// Every edit goes through an action so it can be undone. An action captures
/// the objects it affects when it is built, and records whatever previous
/// state it needs the first time it runs.
///
/// # Example
/// ```no_run
/// use tune_composer::action::{Action, ActionKind, ActionResult, EditorState};
/// use tune_composer::composition::ObjectId;
///
/// struct NudgeRight {
///     target: ObjectId,
/// }
///
/// impl Action for NudgeRight {
///     fn execute(&mut self, state: &mut EditorState) -> ActionResult<()> {
///         state.composition.move_by(self.target, 20, 0)?;
///         Ok(())
///     }
///
///     fn undo(&mut self, state: &mut EditorState) -> ActionResult<()> {
///         state.composition.move_by(self.target, -20, 0)?;
///         Ok(())
///     }
///
///     fn kind(&self) -> ActionKind {
///         ActionKind::Move
///     }
///
///     fn description(&self) -> String {
///         format!("Nudge {}", self.target)
///     }
/// }
/// ```
pub trait Action {
    /// Apply the action
    ///
    /// A failing action must leave the state as it found it.
    fn execute(&mut self, state: &mut EditorState) -> ActionResult<()>;

    /// Revert the action, restoring the state seen before `execute`
    fn undo(&mut self, state: &mut EditorState) -> ActionResult<()>;

    /// Re-apply the action after an undo
    ///
    /// Defaults to `execute`.
    fn redo(&mut self, state: &mut EditorState) -> ActionResult<()> {
        self.execute(state)
    }

    fn kind(&self) -> ActionKind;

    /// Human-readable description (e.g. "Move 2 objects")
    fn description(&self) -> String;
}

/// Ordered list of actions applied and reverted as one history entry
#[derive(Default)]
pub struct CompoundAction {
    actions: Vec<Box<dyn Action>>,
    label: Option<String>,
}

impl CompoundAction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty list with a fixed description
    pub fn with_label(label: impl Into<String>) -> Self {
        Self {
            actions: Vec::new(),
            label: Some(label.into()),
        }
    }

    pub fn push(&mut self, action: impl Action + 'static) {
        self.actions.push(Box::new(action));
    }

    pub fn push_boxed(&mut self, action: Box<dyn Action>) {
        self.actions.push(action);
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Kinds of the member actions in order
    pub fn kinds(&self) -> Vec<ActionKind> {
        self.actions.iter().map(|action| action.kind()).collect()
    }

    pub fn contains_kind(&self, kind: ActionKind) -> bool {
        self.actions.iter().any(|action| action.kind() == kind)
    }

    /// Label if one was given, otherwise the members' descriptions
    pub fn description(&self) -> String {
        if let Some(label) = &self.label {
            return label.clone();
        }
        self.actions
            .iter()
            .map(|action| action.description())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Apply every member in order
    ///
    /// When a member fails, the members already applied are undone in reverse
    /// order and the error is returned.
    pub(crate) fn execute_all(&mut self, state: &mut EditorState) -> ActionResult<()> {
        for index in 0..self.actions.len() {
            if let Err(e) = self.actions[index].execute(state) {
                self.rollback(state, index);
                return Err(e);
            }
        }
        Ok(())
    }

    /// Re-apply every member in order, with the same rollback as `execute_all`
    pub(crate) fn redo_all(&mut self, state: &mut EditorState) -> ActionResult<()> {
        for index in 0..self.actions.len() {
            if let Err(e) = self.actions[index].redo(state) {
                self.rollback(state, index);
                return Err(e);
            }
        }
        Ok(())
    }

    /// Revert every member in reverse order
    ///
    /// When a member fails, the members already reverted are re-applied in
    /// order so the list stays fully applied, and the error is returned.
    pub(crate) fn undo_all(&mut self, state: &mut EditorState) -> ActionResult<()> {
        for index in (0..self.actions.len()).rev() {
            if let Err(e) = self.actions[index].undo(state) {
                self.restore(state, index + 1);
                return Err(e);
            }
        }
        Ok(())
    }

    fn restore(&mut self, state: &mut EditorState, reverted_from: usize) {
        for action in self.actions[reverted_from..].iter_mut() {
            if let Err(e) = action.redo(state) {
                log::warn!("Re-applying '{}' failed: {}", action.description(), e);
            }
        }
    }

    fn rollback(&mut self, state: &mut EditorState, applied: usize) {
        for action in self.actions[..applied].iter_mut().rev() {
            if let Err(e) = action.undo(state) {
                log::warn!("Rollback of '{}' failed: {}", action.description(), e);
            }
        }
    }
}

impl fmt::Debug for CompoundAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompoundAction")
            .field("kinds", &self.kinds())
            .field("label", &self.label)
            .finish()
    }
}
