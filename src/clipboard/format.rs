// Clipboard document format
//
// Serialized form of a set of sound objects. Gesture boxes are not stored:
// they are derived from the children when the document is decoded.

use crate::composition::Instrument;
use serde::{Deserialize, Serialize};

/// Current clipboard document version
pub const CLIPBOARD_VERSION: u32 = 1;

/// Top-level clipboard payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipboardDocument {
    pub version: u32,
    pub objects: Vec<SerializedObject>,
}

impl ClipboardDocument {
    pub fn new(objects: Vec<SerializedObject>) -> Self {
        Self {
            version: CLIPBOARD_VERSION,
            objects,
        }
    }

    /// Number of notes in the document, nested ones included
    pub fn note_count(&self) -> usize {
        self.objects.iter().map(SerializedObject::note_count).sum()
    }
}

/// One serialized sound object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SerializedObject {
    Note {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        instrument: Instrument,
    },
    Gesture {
        children: Vec<SerializedObject>,
    },
}

impl SerializedObject {
    fn note_count(&self) -> usize {
        match self {
            SerializedObject::Note { .. } => 1,
            SerializedObject::Gesture { children } => {
                children.iter().map(SerializedObject::note_count).sum()
            }
        }
    }
}
