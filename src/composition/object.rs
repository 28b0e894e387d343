// Sound objects - Notes and gestures placed on the composition pane
// A sound object is either a leaf note or a gesture grouping other objects

use crate::composition::geometry::{Grid, Rect};
use crate::composition::instrument::Instrument;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a sound object inside a [`Composition`](super::Composition)
///
/// Ids index the composition's arena and stay valid for the whole document
/// session, including while the object is detached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub(crate) usize);

impl ObjectId {
    /// Raw arena index
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Leaf sound object
///
/// Start time and pitch are not stored: they are read from the object's
/// bounding box so a moved note can never disagree with its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Note {
    pub instrument: Instrument,
}

/// Composite sound object owning an ordered list of children
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Gesture {
    pub(crate) children: Vec<ObjectId>,
}

impl Gesture {
    /// Direct children in order
    pub fn children(&self) -> &[ObjectId] {
        &self.children
    }
}

/// Variant part of a sound object
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoundObjectKind {
    Note(Note),
    Gesture(Gesture),
}

/// A node of the sound object tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundObject {
    pub(crate) id: ObjectId,
    pub(crate) bounds: Rect,
    pub(crate) selected: bool,
    pub(crate) parent: Option<ObjectId>,
    pub(crate) kind: SoundObjectKind,
}

impl SoundObject {
    pub(crate) fn new_note(id: ObjectId, bounds: Rect, instrument: Instrument) -> Self {
        Self {
            id,
            bounds,
            selected: true,
            parent: None,
            kind: SoundObjectKind::Note(Note { instrument }),
        }
    }

    pub(crate) fn new_gesture(id: ObjectId) -> Self {
        Self {
            id,
            bounds: Rect::new(0, 0, 0, 0),
            selected: false,
            parent: None,
            kind: SoundObjectKind::Gesture(Gesture::default()),
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Current bounding box
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Nearest enclosing gesture, `None` for a root
    pub fn parent(&self) -> Option<ObjectId> {
        self.parent
    }

    pub fn kind(&self) -> &SoundObjectKind {
        &self.kind
    }

    pub fn is_gesture(&self) -> bool {
        matches!(self.kind, SoundObjectKind::Gesture(_))
    }

    pub fn as_note(&self) -> Option<&Note> {
        match &self.kind {
            SoundObjectKind::Note(note) => Some(note),
            SoundObjectKind::Gesture(_) => None,
        }
    }

    pub fn as_gesture(&self) -> Option<&Gesture> {
        match &self.kind {
            SoundObjectKind::Gesture(gesture) => Some(gesture),
            SoundObjectKind::Note(_) => None,
        }
    }

    /// Direct children (empty for a note)
    pub fn children(&self) -> &[ObjectId] {
        match &self.kind {
            SoundObjectKind::Gesture(gesture) => &gesture.children,
            SoundObjectKind::Note(_) => &[],
        }
    }

    /// Instrument of a note, `None` for a gesture
    pub fn instrument(&self) -> Option<Instrument> {
        self.as_note().map(|note| note.instrument)
    }

    /// Start tick of the object (left edge)
    pub fn start_tick(&self) -> i32 {
        self.bounds.x
    }

    /// Duration in ticks (width)
    pub fn duration(&self) -> i32 {
        self.bounds.width
    }

    /// MIDI pitch of a note derived from its row
    pub fn pitch(&self, grid: &Grid) -> Option<u8> {
        self.as_note().map(|_| grid.pitch_for_y(self.bounds.y))
    }
}
