// Selection - Selection flags on the sound object tree
//
// Selecting or unselecting an object applies to everything it contains. A
// gesture reads as selected exactly when all of its direct children are.

use crate::composition::object::ObjectId;
use crate::composition::tree::{Composition, CompositionResult};

/// Recorded selection flags, restored verbatim on undo
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSnapshot {
    flags: Vec<(ObjectId, bool)>,
    roots: Vec<ObjectId>,
}

impl SelectionSnapshot {
    /// Recorded (object, flag) pairs
    pub fn flags(&self) -> &[(ObjectId, bool)] {
        &self.flags
    }
}

impl Composition {
    pub fn is_selected(&self, id: ObjectId) -> CompositionResult<bool> {
        Ok(self.get(id)?.selected)
    }

    /// Select `id` and everything it contains
    pub fn select(&mut self, id: ObjectId) -> CompositionResult<()> {
        self.set_selected(id, true)
    }

    /// Unselect `id` and everything it contains
    pub fn unselect(&mut self, id: ObjectId) -> CompositionResult<()> {
        self.set_selected(id, false)
    }

    /// Unselect a fully selected object, select anything else
    pub fn toggle_selection(&mut self, id: ObjectId) -> CompositionResult<()> {
        let selected = self.is_selected(id)?;
        self.set_selected(id, !selected)
    }

    fn set_selected(&mut self, id: ObjectId, selected: bool) -> CompositionResult<()> {
        for object in self.subtree(id)? {
            self.objects[object.0].selected = selected;
        }
        self.refresh_selection_upwards(id);
        Ok(())
    }

    /// Recompute the flags of every gesture enclosing `id`
    pub(crate) fn refresh_selection_upwards(&mut self, id: ObjectId) {
        if let Ok(ancestors) = self.ancestors(id) {
            for ancestor in ancestors {
                self.refresh_gesture_selection(ancestor);
            }
        }
    }

    /// Derive a gesture's flag from its direct children
    ///
    /// An empty gesture keeps its current flag.
    pub(crate) fn refresh_gesture_selection(&mut self, gesture: ObjectId) {
        let object = &self.objects[gesture.0];
        if object.children().is_empty() {
            return;
        }
        let all = object
            .children()
            .iter()
            .all(|child| self.objects[child.0].selected);
        self.objects[gesture.0].selected = all;
    }

    /// Top-level attached objects that are selected, in pane order
    pub fn current_selection(&self) -> Vec<ObjectId> {
        self.top_level
            .iter()
            .copied()
            .filter(|id| self.objects[id.0].selected)
            .collect()
    }

    /// Top-level attached objects that are not selected, in pane order
    pub fn unselected_objects(&self) -> Vec<ObjectId> {
        self.top_level
            .iter()
            .copied()
            .filter(|id| !self.objects[id.0].selected)
            .collect()
    }

    /// True when the selection contains at least one gesture
    pub fn has_any_gesture_selected(&self) -> bool {
        self.top_level
            .iter()
            .any(|id| self.objects[id.0].selected && self.objects[id.0].is_gesture())
    }

    /// Record the flags of `ids`, their contents and their enclosing gestures
    pub fn selection_snapshot(&self, ids: &[ObjectId]) -> CompositionResult<SelectionSnapshot> {
        let mut flags = Vec::new();
        for &id in ids {
            for object in self.subtree(id)? {
                flags.push((object, self.objects[object.0].selected));
            }
            for ancestor in self.ancestors(id)? {
                flags.push((ancestor, self.objects[ancestor.0].selected));
            }
        }
        Ok(SelectionSnapshot {
            flags,
            roots: ids.to_vec(),
        })
    }

    /// Put recorded flags back in place
    pub fn restore_selection(&mut self, snapshot: &SelectionSnapshot) -> CompositionResult<()> {
        for &(id, _) in &snapshot.flags {
            self.get(id)?;
        }
        for &(id, selected) in snapshot.flags.iter().rev() {
            self.objects[id.0].selected = selected;
        }
        for &root in &snapshot.roots {
            self.refresh_selection_upwards(root);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::composition::{Composition, Instrument, ObjectId};

    fn three_notes() -> (Composition, Vec<ObjectId>) {
        let mut composition = Composition::default();
        let ids: Vec<ObjectId> = (0..3)
            .map(|i| {
                let id = composition.create_note(i * 200, 60, 100, Instrument::Piano);
                composition.attach(id).unwrap();
                id
            })
            .collect();
        (composition, ids)
    }

    #[test]
    fn test_new_notes_start_selected() {
        let (composition, ids) = three_notes();
        assert_eq!(composition.current_selection(), ids);
    }

    #[test]
    fn test_select_propagates_down() {
        let (mut composition, ids) = three_notes();
        let gesture = composition.group(&ids[..2]).unwrap();

        composition.unselect(gesture).unwrap();
        assert!(!composition.is_selected(ids[0]).unwrap());
        assert!(!composition.is_selected(ids[1]).unwrap());

        composition.select(gesture).unwrap();
        assert!(composition.is_selected(ids[0]).unwrap());
        assert!(composition.is_selected(ids[1]).unwrap());
    }

    #[test]
    fn test_gesture_flag_follows_children() {
        let (mut composition, ids) = three_notes();
        let gesture = composition.group(&ids[..2]).unwrap();

        composition.unselect(ids[0]).unwrap();
        assert!(!composition.is_selected(gesture).unwrap());
        assert!(composition.is_selected(ids[1]).unwrap());

        composition.select(ids[0]).unwrap();
        assert!(composition.is_selected(gesture).unwrap());
    }

    #[test]
    fn test_toggle() {
        let (mut composition, ids) = three_notes();
        composition.toggle_selection(ids[0]).unwrap();
        assert!(!composition.is_selected(ids[0]).unwrap());
        composition.toggle_selection(ids[0]).unwrap();
        assert!(composition.is_selected(ids[0]).unwrap());
    }

    #[test]
    fn test_gesture_detection() {
        let (mut composition, ids) = three_notes();
        assert!(!composition.has_any_gesture_selected());

        let gesture = composition.group(&ids[..2]).unwrap();
        assert!(composition.has_any_gesture_selected());

        composition.unselect(gesture).unwrap();
        assert!(!composition.has_any_gesture_selected());
        assert_eq!(composition.unselected_objects(), vec![gesture]);
    }

    #[test]
    fn test_snapshot_restores_mixed_flags() {
        let (mut composition, ids) = three_notes();
        let gesture = composition.group(&ids[..2]).unwrap();
        composition.unselect(ids[1]).unwrap();

        let snapshot = composition.selection_snapshot(&[gesture, ids[2]]).unwrap();
        composition.select(gesture).unwrap();
        composition.unselect(ids[2]).unwrap();

        composition.restore_selection(&snapshot).unwrap();
        assert!(composition.is_selected(ids[0]).unwrap());
        assert!(!composition.is_selected(ids[1]).unwrap());
        assert!(!composition.is_selected(gesture).unwrap());
        assert!(composition.is_selected(ids[2]).unwrap());
    }
}
