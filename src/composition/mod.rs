// Composition - Sound object tree (notes and gestures) on the editing pane

pub mod geometry;
pub mod instrument;
pub mod object;
pub mod selection;
pub mod tree;

pub use geometry::{Grid, Rect};
pub use instrument::{Instrument, UnknownInstrument};
pub use object::{Gesture, Note, ObjectId, SoundObject, SoundObjectKind};
pub use selection::SelectionSnapshot;
pub use tree::{
    Composition, CompositionError, CompositionResult, CompositionSnapshot, ObjectSnapshot,
    Placement,
};
