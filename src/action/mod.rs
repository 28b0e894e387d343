// Action Pattern for Undo/Redo functionality
//
// Every edit of the composition goes through an Action so it can be undone.
//
// Architecture:
// - Action trait: execute(), undo(), redo(), kind(), description()
// - CompoundAction: ordered list of actions forming one history entry
// - ActionManager: undo/redo stacks of compound lists
// - Concrete actions: AddAction, DeleteAction, MoveAction, GroupAction, etc.
//
// Actions capture the objects they affect when they are built and record the
// previous state they need the first time they run.

pub mod actions;
pub mod manager;
pub mod state;
pub mod trait_def;

pub use actions::{
    AddAction, ChangeInstrumentAction, CopyAction, DeleteAction, GroupAction,
    LengthChangeAction, MoveAction, PasteAction, SelectionAction, UngroupAction,
};
pub use manager::ActionManager;
pub use state::EditorState;
pub use trait_def::{Action, ActionError, ActionKind, ActionResult, CompoundAction};
