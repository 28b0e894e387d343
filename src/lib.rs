// TuneComposer - Library exports for the editor core, tests and benchmarks

pub mod action;
pub mod clipboard;
pub mod composition;
pub mod config;
pub mod editor;
pub mod host;
pub mod playback;

// Re-export commonly used types for convenience
pub use action::{Action, ActionError, ActionKind, ActionManager, CompoundAction, EditorState};
pub use clipboard::ClipboardError;
pub use composition::{
    Composition, CompositionError, Grid, Instrument, ObjectId, Rect, SoundObject, SoundObjectKind,
};
pub use config::{ConfigError, EditorConfig};
pub use editor::{Availability, DragMode, Editor};
pub use playback::NoteEvent;
