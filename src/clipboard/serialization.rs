// Serialization utilities for clipboard transfer

use crate::clipboard::format::{CLIPBOARD_VERSION, ClipboardDocument, SerializedObject};
use crate::clipboard::ClipboardError;
use crate::composition::{Composition, ObjectId, Placement, Rect, SoundObjectKind};

/// Serialize sound objects (with their nesting) to clipboard text
pub fn encode(composition: &Composition, ids: &[ObjectId]) -> Result<String, ClipboardError> {
    let objects = ids
        .iter()
        .map(|&id| to_serialized(composition, id))
        .collect::<Result<Vec<_>, _>>()?;
    let document = ClipboardDocument::new(objects);
    Ok(ron::to_string(&document)?)
}

fn to_serialized(composition: &Composition, id: ObjectId) -> Result<SerializedObject, ClipboardError> {
    let object = composition.get(id)?;
    match object.kind() {
        SoundObjectKind::Note(note) => {
            let bounds = object.bounds();
            Ok(SerializedObject::Note {
                x: bounds.x,
                y: bounds.y,
                width: bounds.width,
                height: bounds.height,
                instrument: note.instrument,
            })
        }
        SoundObjectKind::Gesture(gesture) => Ok(SerializedObject::Gesture {
            children: gesture
                .children()
                .iter()
                .map(|&child| to_serialized(composition, child))
                .collect::<Result<Vec<_>, _>>()?,
        }),
    }
}

/// Parse clipboard text without touching any composition
pub fn parse_document(text: &str) -> Result<ClipboardDocument, ClipboardError> {
    if text.trim().is_empty() {
        return Err(ClipboardError::EmptyClipboard);
    }
    let document: ClipboardDocument = ron::from_str(text)?;
    validate_document(&document)?;
    Ok(document)
}

/// Check a whole document before anything is instantiated
pub fn validate_document(document: &ClipboardDocument) -> Result<(), ClipboardError> {
    if document.version != CLIPBOARD_VERSION {
        return Err(ClipboardError::UnsupportedVersion(document.version));
    }

    if document.objects.is_empty() {
        return Err(ClipboardError::EmptyDocument);
    }

    document.objects.iter().try_for_each(validate_object)
}

fn validate_object(object: &SerializedObject) -> Result<(), ClipboardError> {
    match object {
        SerializedObject::Note {
            x,
            y,
            width,
            height,
            ..
        } => {
            if *width <= 0 || *height <= 0 {
                return Err(ClipboardError::InvalidGeometry(format!(
                    "Note size must be positive, got {}x{}",
                    width, height
                )));
            }
            if x.checked_add(*width).is_none() || y.checked_add(*height).is_none() {
                return Err(ClipboardError::InvalidGeometry(format!(
                    "Note at ({}, {}) overflows the coordinate range",
                    x, y
                )));
            }
            Ok(())
        }
        SerializedObject::Gesture { children } => {
            if children.is_empty() {
                return Err(ClipboardError::EmptyGesture);
            }
            children.iter().try_for_each(validate_object)
        }
    }
}

/// Fail unless every note of a validated document lies inside `pane`
fn ensure_on_pane(objects: &[SerializedObject], pane: &Rect) -> Result<(), ClipboardError> {
    for object in objects {
        match object {
            SerializedObject::Note {
                x,
                y,
                width,
                height,
                ..
            } => {
                if !pane.contains_rect(&Rect::new(*x, *y, *width, *height)) {
                    return Err(ClipboardError::InvalidGeometry(format!(
                        "Note at ({}, {}) lies outside the pane",
                        x, y
                    )));
                }
            }
            SerializedObject::Gesture { children } => ensure_on_pane(children, pane)?,
        }
    }
    Ok(())
}

/// Decode clipboard text into new, detached, selected objects
///
/// Returns the ids of the decoded roots in document order. On error the
/// composition is left untouched.
pub fn decode(text: &str, composition: &mut Composition) -> Result<Vec<ObjectId>, ClipboardError> {
    let document = parse_document(text)
        .and_then(|document| {
            ensure_on_pane(&document.objects, &composition.grid().pane())?;
            Ok(document)
        })
        .inspect_err(|e| {
            log::warn!("Rejected clipboard contents: {}", e);
        })?;
    instantiate(&document, composition)
}

/// Create detached objects for an already validated document
pub fn instantiate(
    document: &ClipboardDocument,
    composition: &mut Composition,
) -> Result<Vec<ObjectId>, ClipboardError> {
    let mut roots = Vec::with_capacity(document.objects.len());
    for object in &document.objects {
        let id = build(object, composition)?;
        composition.select(id)?;
        roots.push(id);
    }
    log::debug!(
        "Decoded {} clipboard objects ({} notes)",
        roots.len(),
        document.note_count()
    );
    Ok(roots)
}

fn build(object: &SerializedObject, composition: &mut Composition) -> Result<ObjectId, ClipboardError> {
    match object {
        SerializedObject::Note {
            x,
            y,
            width,
            height,
            instrument,
        } => Ok(composition.create_note_with_bounds(Rect::new(*x, *y, *width, *height), *instrument)),
        SerializedObject::Gesture { children } => {
            let gesture = composition.create_gesture();
            for (index, child) in children.iter().enumerate() {
                let child = build(child, composition)?;
                composition.attach_at(
                    child,
                    Placement {
                        parent: Some(gesture),
                        index,
                    },
                )?;
            }
            Ok(gesture)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::Instrument;

    fn sample() -> (Composition, Vec<ObjectId>) {
        let mut composition = Composition::default();
        let a = composition.create_note(0, 60, 100, Instrument::Piano);
        let b = composition.create_note(200, 80, 100, Instrument::Organ);
        let c = composition.create_note(400, 20, 40, Instrument::Guitar);
        for id in [a, b, c] {
            composition.attach(id).unwrap();
        }
        let gesture = composition.group(&[a, b]).unwrap();
        (composition, vec![gesture, c])
    }

    #[test]
    fn test_encode_contains_tags() {
        let (composition, roots) = sample();
        let text = encode(&composition, &roots).unwrap();

        assert!(text.contains("Gesture"));
        assert!(text.contains("Note"));
        assert!(text.contains("Organ"));
        assert!(text.contains("version:1"));
    }

    #[test]
    fn test_decode_rebuilds_nesting() {
        let (source, roots) = sample();
        let text = encode(&source, &roots).unwrap();

        let mut target = Composition::default();
        let decoded = decode(&text, &mut target).unwrap();
        assert_eq!(decoded.len(), 2);

        let gesture = target.get(decoded[0]).unwrap();
        assert!(gesture.is_gesture());
        assert_eq!(gesture.children().len(), 2);
        assert_eq!(gesture.bounds(), source.get(roots[0]).unwrap().bounds());
        assert!(gesture.is_selected());

        let first = target.get(gesture.children()[0]).unwrap();
        assert_eq!(first.parent(), Some(decoded[0]));
        assert_eq!(first.instrument(), Some(Instrument::Piano));

        // Decoded objects are not on the pane yet
        assert!(target.is_empty());
        assert!(!target.is_attached(decoded[1]));
    }

    #[test]
    fn test_decode_garbage_leaves_composition_untouched() {
        let mut composition = Composition::default();
        let result = decode("this is not a score", &mut composition);

        assert!(matches!(result, Err(ClipboardError::Parse(_))));
        assert_eq!(composition.object_count(), 0);
    }

    #[test]
    fn test_validation_happens_before_instantiation() {
        // The second object is invalid, so the first must not be created either
        let text = "(version: 1, objects: [\
            Note(x: 0, y: 0, width: 100, height: 10, instrument: Piano),\
            Gesture(children: [])])";
        let mut composition = Composition::default();

        assert!(matches!(
            decode(text, &mut composition),
            Err(ClipboardError::EmptyGesture)
        ));
        assert_eq!(composition.object_count(), 0);
    }

    #[test]
    fn test_rejects_bad_documents() {
        let mut composition = Composition::default();

        assert!(matches!(
            decode("", &mut composition),
            Err(ClipboardError::EmptyClipboard)
        ));
        assert!(matches!(
            decode("(version: 1, objects: [])", &mut composition),
            Err(ClipboardError::EmptyDocument)
        ));
        assert!(matches!(
            decode(
                "(version: 9, objects: [Note(x: 0, y: 0, width: 1, height: 1, instrument: Piano)])",
                &mut composition
            ),
            Err(ClipboardError::UnsupportedVersion(9))
        ));
        assert!(matches!(
            decode(
                "(version: 1, objects: [Note(x: 0, y: 0, width: 0, height: 10, instrument: Piano)])",
                &mut composition
            ),
            Err(ClipboardError::InvalidGeometry(_))
        ));
        assert_eq!(composition.object_count(), 0);
    }

    #[test]
    fn test_rejects_out_of_range_coordinates() {
        let mut composition = Composition::default();

        // Parses fine, but x + width does not fit in an i32
        let overflowing = "(version: 1, objects: [Gesture(children: [\
            Note(x: 2147483600, y: 60, width: 100, height: 10, instrument: Piano),\
            Note(x: 0, y: 60, width: 100, height: 10, instrument: Piano)])])";
        assert!(matches!(
            decode(overflowing, &mut composition),
            Err(ClipboardError::InvalidGeometry(_))
        ));

        let off_pane = "(version: 1, objects: [\
            Note(x: -40, y: 60, width: 100, height: 10, instrument: Piano)])";
        assert!(matches!(
            decode(off_pane, &mut composition),
            Err(ClipboardError::InvalidGeometry(_))
        ));
        assert_eq!(composition.object_count(), 0);
    }

    #[test]
    fn test_encode_unknown_object() {
        let composition = Composition::default();
        assert!(matches!(
            encode(&composition, &[ObjectId(3)]),
            Err(ClipboardError::Composition(_))
        ));
    }
}
