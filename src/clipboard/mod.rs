// Clipboard serializer - Text form of sound objects for copy and paste
// Documents are versioned RON; decoding validates everything up front

pub mod format;
pub mod serialization;

use crate::composition::CompositionError;

pub use format::{CLIPBOARD_VERSION, ClipboardDocument, SerializedObject};
pub use serialization::{decode, encode, instantiate, parse_document, validate_document};

/// Errors raised while encoding or decoding clipboard text
#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("RON error: {0}")]
    Serialize(#[from] ron::Error),

    #[error("Malformed clipboard contents: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("Unsupported clipboard format version {0}")]
    UnsupportedVersion(u32),

    #[error("Clipboard document holds no sound objects")]
    EmptyDocument,

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Clipboard gesture has no children")]
    EmptyGesture,

    #[error("Clipboard is empty")]
    EmptyClipboard,

    #[error(transparent)]
    Composition(#[from] CompositionError),
}
