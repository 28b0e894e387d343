// Concrete action implementations

use crate::action::state::EditorState;
use crate::action::trait_def::{Action, ActionError, ActionKind, ActionResult};
use crate::clipboard::{self, ClipboardError};
use crate::composition::{
    Composition, CompositionError, Instrument, ObjectId, Placement, SelectionSnapshot,
};

fn count(n: usize) -> String {
    if n == 1 {
        "1 object".to_string()
    } else {
        format!("{} objects", n)
    }
}

/// Fail unless every id exists
fn ensure_known(composition: &Composition, ids: &[ObjectId]) -> ActionResult<()> {
    for &id in ids {
        composition.get(id)?;
    }
    Ok(())
}

/// Fail unless every id is a distinct root that is not on the pane
fn ensure_detached_roots(composition: &Composition, ids: &[ObjectId]) -> ActionResult<()> {
    for (i, &id) in ids.iter().enumerate() {
        let object = composition.get(id)?;
        if object.parent().is_some() || composition.top_level().contains(&id) {
            return Err(CompositionError::AlreadyAttached(id).into());
        }
        if ids[..i].contains(&id) {
            return Err(CompositionError::DuplicateMember(id).into());
        }
    }
    Ok(())
}

/// Action that puts detached objects on the pane
///
/// Used for notes placed with a click. The objects must already exist in the
/// composition (see [`Composition::create_note`]).
#[derive(Debug)]
pub struct AddAction {
    objects: Vec<ObjectId>,
}

impl AddAction {
    pub fn new(objects: Vec<ObjectId>) -> Self {
        Self { objects }
    }

    pub fn objects(&self) -> &[ObjectId] {
        &self.objects
    }
}

impl Action for AddAction {
    fn execute(&mut self, state: &mut EditorState) -> ActionResult<()> {
        ensure_detached_roots(&state.composition, &self.objects)?;
        for &id in &self.objects {
            state.composition.attach(id)?;
            state.show_subtree(id)?;
        }
        Ok(())
    }

    fn undo(&mut self, state: &mut EditorState) -> ActionResult<()> {
        for &id in self.objects.iter().rev() {
            state.composition.detach(id)?;
            state.hide_subtree(id)?;
        }
        Ok(())
    }

    fn kind(&self) -> ActionKind {
        ActionKind::Add
    }

    fn description(&self) -> String {
        format!("Add {}", count(self.objects.len()))
    }
}

/// Action that removes objects from the tree
///
/// Each object remembers its container and slot so undo puts it back exactly
/// where it was.
#[derive(Debug)]
pub struct DeleteAction {
    objects: Vec<ObjectId>,
    placements: Vec<Placement>,
}

impl DeleteAction {
    pub fn new(objects: Vec<ObjectId>) -> Self {
        Self {
            objects,
            placements: Vec::new(),
        }
    }
}

impl Action for DeleteAction {
    fn execute(&mut self, state: &mut EditorState) -> ActionResult<()> {
        for &id in &self.objects {
            if !state.composition.is_attached(id) {
                state.composition.get(id)?;
                return Err(CompositionError::NotAttached(id).into());
            }
        }

        self.placements.clear();
        for &id in &self.objects {
            let placement = state.composition.detach(id)?;
            state.hide_subtree(id)?;
            self.placements.push(placement);
        }
        Ok(())
    }

    fn undo(&mut self, state: &mut EditorState) -> ActionResult<()> {
        if self.placements.len() != self.objects.len() {
            return Err(ActionError::UndoFailed("No placements recorded".into()));
        }
        for (&id, &placement) in self.objects.iter().zip(&self.placements).rev() {
            state.composition.attach_at(id, placement)?;
            state.show_subtree(id)?;
        }
        Ok(())
    }

    fn kind(&self) -> ActionKind {
        ActionKind::Delete
    }

    fn description(&self) -> String {
        format!("Delete {}", count(self.objects.len()))
    }
}

/// Action that shifts objects by a fixed offset
#[derive(Debug)]
pub struct MoveAction {
    objects: Vec<ObjectId>,
    dx: i32,
    dy: i32,
}

impl MoveAction {
    pub fn new(objects: Vec<ObjectId>, dx: i32, dy: i32) -> Self {
        Self { objects, dx, dy }
    }

    /// Offset accumulated so far
    pub fn delta(&self) -> (i32, i32) {
        (self.dx, self.dy)
    }

    /// Apply one more step of a live drag and fold it into the action
    pub fn step(&mut self, state: &mut EditorState, dx: i32, dy: i32) -> ActionResult<()> {
        ensure_known(&state.composition, &self.objects)?;
        for &id in &self.objects {
            state.composition.move_by(id, dx, dy)?;
        }
        self.dx += dx;
        self.dy += dy;
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.dx == 0 && self.dy == 0
    }
}

impl Action for MoveAction {
    fn execute(&mut self, state: &mut EditorState) -> ActionResult<()> {
        ensure_known(&state.composition, &self.objects)?;
        for &id in &self.objects {
            state.composition.move_by(id, self.dx, self.dy)?;
        }
        Ok(())
    }

    fn undo(&mut self, state: &mut EditorState) -> ActionResult<()> {
        for &id in self.objects.iter().rev() {
            state.composition.move_by(id, -self.dx, -self.dy)?;
        }
        Ok(())
    }

    fn kind(&self) -> ActionKind {
        ActionKind::Move
    }

    fn description(&self) -> String {
        format!("Move {}", count(self.objects.len()))
    }
}

/// Action that grows or shrinks every note of the captured objects
///
/// Lengths are clamped at the minimum, so the action records the exact
/// per-note lengths before and after rather than replaying the delta.
#[derive(Debug)]
pub struct LengthChangeAction {
    objects: Vec<ObjectId>,
    delta: i32,
    before: Vec<(ObjectId, i32)>,
    after: Vec<(ObjectId, i32)>,
}

impl LengthChangeAction {
    pub fn new(objects: Vec<ObjectId>, delta: i32) -> Self {
        Self {
            objects,
            delta,
            before: Vec::new(),
            after: Vec::new(),
        }
    }

    /// Total change requested so far
    pub fn delta(&self) -> i32 {
        self.delta
    }

    /// True when no note length differs from before the first step
    ///
    /// Clamped steps make the requested delta unreliable for this.
    pub fn is_noop(&self) -> bool {
        self.before == self.after
    }

    fn lengths(&self, composition: &Composition) -> ActionResult<Vec<(ObjectId, i32)>> {
        let mut lengths = Vec::new();
        for &id in &self.objects {
            lengths.extend(composition.leaf_lengths(id)?);
        }
        Ok(lengths)
    }

    fn apply(&mut self, state: &mut EditorState, delta: i32) -> ActionResult<()> {
        for &id in &self.objects {
            state.composition.change_length(id, delta)?;
        }
        self.after = self.lengths(&state.composition)?;
        Ok(())
    }

    /// Apply one more step of a live resize drag and fold it into the action
    pub fn step(&mut self, state: &mut EditorState, delta: i32) -> ActionResult<()> {
        if self.before.is_empty() {
            self.before = self.lengths(&state.composition)?;
        }
        self.apply(state, delta)?;
        self.delta += delta;
        Ok(())
    }
}

impl Action for LengthChangeAction {
    fn execute(&mut self, state: &mut EditorState) -> ActionResult<()> {
        self.before = self.lengths(&state.composition)?;
        self.apply(state, self.delta)
    }

    fn undo(&mut self, state: &mut EditorState) -> ActionResult<()> {
        state.composition.set_leaf_lengths(&self.before)?;
        Ok(())
    }

    fn redo(&mut self, state: &mut EditorState) -> ActionResult<()> {
        state.composition.set_leaf_lengths(&self.after)?;
        Ok(())
    }

    fn kind(&self) -> ActionKind {
        ActionKind::LengthChange
    }

    fn description(&self) -> String {
        format!("Change length of {}", count(self.objects.len()))
    }
}

/// Action that selects or unselects a frozen list of objects
#[derive(Debug)]
pub struct SelectionAction {
    objects: Vec<ObjectId>,
    selected: bool,
    previous: Option<SelectionSnapshot>,
}

impl SelectionAction {
    pub fn select(objects: Vec<ObjectId>) -> Self {
        Self {
            objects,
            selected: true,
            previous: None,
        }
    }

    pub fn unselect(objects: Vec<ObjectId>) -> Self {
        Self {
            objects,
            selected: false,
            previous: None,
        }
    }

    pub fn objects(&self) -> &[ObjectId] {
        &self.objects
    }
}

impl Action for SelectionAction {
    fn execute(&mut self, state: &mut EditorState) -> ActionResult<()> {
        self.previous = Some(state.composition.selection_snapshot(&self.objects)?);
        for &id in &self.objects {
            if self.selected {
                state.composition.select(id)?;
            } else {
                state.composition.unselect(id)?;
            }
        }
        Ok(())
    }

    fn undo(&mut self, state: &mut EditorState) -> ActionResult<()> {
        let previous = self
            .previous
            .as_ref()
            .ok_or_else(|| ActionError::UndoFailed("No previous selection stored".into()))?;
        state.composition.restore_selection(previous)?;
        Ok(())
    }

    fn kind(&self) -> ActionKind {
        if self.selected {
            ActionKind::Select
        } else {
            ActionKind::Unselect
        }
    }

    fn description(&self) -> String {
        format!("{} {}", self.kind(), count(self.objects.len()))
    }
}

/// Action that assigns one instrument to every note of the captured objects
#[derive(Debug)]
pub struct ChangeInstrumentAction {
    objects: Vec<ObjectId>,
    instrument: Instrument,
    previous: Vec<(ObjectId, Instrument)>,
}

impl ChangeInstrumentAction {
    /// Capture the objects and the instrument each of their notes has now
    pub fn new(
        composition: &Composition,
        objects: Vec<ObjectId>,
        instrument: Instrument,
    ) -> ActionResult<Self> {
        let mut previous = Vec::new();
        for &id in &objects {
            previous.extend(composition.leaf_instruments(id)?);
        }
        Ok(Self {
            objects,
            instrument,
            previous,
        })
    }
}

impl Action for ChangeInstrumentAction {
    fn execute(&mut self, state: &mut EditorState) -> ActionResult<()> {
        ensure_known(&state.composition, &self.objects)?;
        for &id in &self.objects {
            state.composition.set_instrument(id, self.instrument)?;
        }
        Ok(())
    }

    fn undo(&mut self, state: &mut EditorState) -> ActionResult<()> {
        state.composition.restore_instruments(&self.previous)?;
        Ok(())
    }

    fn kind(&self) -> ActionKind {
        ActionKind::ChangeInstrument
    }

    fn description(&self) -> String {
        format!("Set {} to {}", count(self.objects.len()), self.instrument)
    }
}

/// Action that builds a gesture over top-level objects
///
/// The gesture is created on first execution and reused on every redo.
#[derive(Debug)]
pub struct GroupAction {
    members: Vec<ObjectId>,
    gesture: Option<ObjectId>,
    prior_indices: Vec<usize>,
    previous: Option<SelectionSnapshot>,
}

impl GroupAction {
    pub fn new(members: Vec<ObjectId>) -> Self {
        Self {
            members,
            gesture: None,
            prior_indices: Vec::new(),
            previous: None,
        }
    }

    /// Gesture built by this action, once executed
    pub fn gesture(&self) -> Option<ObjectId> {
        self.gesture
    }
}

impl Action for GroupAction {
    fn execute(&mut self, state: &mut EditorState) -> ActionResult<()> {
        state.composition.validate_members(&self.members)?;
        let previous = state.composition.selection_snapshot(&self.members)?;

        let gesture = match self.gesture {
            Some(gesture) => gesture,
            None => state.composition.create_gesture(),
        };
        self.gesture = Some(gesture);
        self.prior_indices = state.composition.group_into(gesture, &self.members)?;
        self.previous = Some(previous);
        state.show(gesture)?;
        Ok(())
    }

    fn undo(&mut self, state: &mut EditorState) -> ActionResult<()> {
        let gesture = self
            .gesture
            .ok_or_else(|| ActionError::UndoFailed("Group was never executed".into()))?;
        state.composition.ungroup_to(gesture, &self.prior_indices)?;
        state.hide(gesture)?;
        if let Some(previous) = &self.previous {
            state.composition.restore_selection(previous)?;
        }
        Ok(())
    }

    fn kind(&self) -> ActionKind {
        ActionKind::Group
    }

    fn description(&self) -> String {
        format!("Group {}", count(self.members.len()))
    }
}

/// Action that dissolves a top-level gesture
#[derive(Debug)]
pub struct UngroupAction {
    gesture: ObjectId,
    children: Vec<ObjectId>,
    previous: Option<SelectionSnapshot>,
}

impl UngroupAction {
    pub fn new(gesture: ObjectId) -> Self {
        Self {
            gesture,
            children: Vec::new(),
            previous: None,
        }
    }
}

impl Action for UngroupAction {
    fn execute(&mut self, state: &mut EditorState) -> ActionResult<()> {
        let previous = state.composition.selection_snapshot(&[self.gesture])?;
        self.children = state.composition.ungroup(self.gesture)?;
        self.previous = Some(previous);
        state.hide(self.gesture)?;
        Ok(())
    }

    fn undo(&mut self, state: &mut EditorState) -> ActionResult<()> {
        state.composition.group_into(self.gesture, &self.children)?;
        state.show(self.gesture)?;
        if let Some(previous) = &self.previous {
            state.composition.restore_selection(previous)?;
        }
        Ok(())
    }

    fn kind(&self) -> ActionKind {
        ActionKind::Ungroup
    }

    fn description(&self) -> String {
        format!("Ungroup {}", self.gesture)
    }
}

/// Action that writes the captured objects to the clipboard
///
/// Copying does not change the composition, so undo and redo do nothing.
#[derive(Debug)]
pub struct CopyAction {
    objects: Vec<ObjectId>,
}

impl CopyAction {
    pub fn new(objects: Vec<ObjectId>) -> Self {
        Self { objects }
    }
}

impl Action for CopyAction {
    fn execute(&mut self, state: &mut EditorState) -> ActionResult<()> {
        let text = clipboard::encode(&state.composition, &self.objects)?;
        state.clipboard.set_text(text);
        Ok(())
    }

    fn undo(&mut self, _state: &mut EditorState) -> ActionResult<()> {
        Ok(())
    }

    fn redo(&mut self, _state: &mut EditorState) -> ActionResult<()> {
        Ok(())
    }

    fn kind(&self) -> ActionKind {
        ActionKind::Copy
    }

    fn description(&self) -> String {
        format!("Copy {}", count(self.objects.len()))
    }
}

/// Action that puts decoded clipboard objects on the pane
///
/// Objects are decoded and the scroll offset read when the action is built,
/// so redo places exactly the same objects at the same spot.
#[derive(Debug)]
pub struct PasteAction {
    roots: Vec<ObjectId>,
    offset: (i32, i32),
}

impl PasteAction {
    pub fn new(roots: Vec<ObjectId>, offset: (i32, i32)) -> Self {
        Self { roots, offset }
    }

    /// Decode the clipboard into detached objects
    ///
    /// Malformed text fails as a whole and creates nothing.
    pub fn from_clipboard(state: &mut EditorState) -> ActionResult<Self> {
        let text = state
            .clipboard
            .get_text()
            .ok_or(ClipboardError::EmptyClipboard)?;
        let roots = clipboard::decode(&text, &mut state.composition)?;
        let offset = state.viewport.current_scroll_offset();
        Ok(Self::new(roots, offset))
    }

    /// Objects this action adds
    pub fn roots(&self) -> &[ObjectId] {
        &self.roots
    }

    /// Fail when shifting any root by the offset leaves the coordinate range
    fn ensure_offset_fits(&self, composition: &Composition) -> ActionResult<()> {
        let (dx, dy) = self.offset;
        for &id in &self.roots {
            let bounds = composition.get(id)?.bounds();
            let fits = bounds
                .x
                .checked_add(bounds.width)
                .and_then(|right| right.checked_add(dx))
                .and(bounds.x.checked_add(dx))
                .and(bounds.y.checked_add(bounds.height))
                .and_then(|bottom| bottom.checked_add(dy))
                .and(bounds.y.checked_add(dy));
            if fits.is_none() {
                return Err(ClipboardError::InvalidGeometry(format!(
                    "Paste offset ({}, {}) moves {} out of range",
                    dx, dy, id
                ))
                .into());
            }
        }
        Ok(())
    }
}

impl Action for PasteAction {
    fn execute(&mut self, state: &mut EditorState) -> ActionResult<()> {
        ensure_detached_roots(&state.composition, &self.roots)?;
        self.ensure_offset_fits(&state.composition)?;
        let (dx, dy) = self.offset;
        for &id in &self.roots {
            state.composition.attach(id)?;
            state.composition.move_by(id, dx, dy)?;
            state.show_subtree(id)?;
        }
        Ok(())
    }

    fn undo(&mut self, state: &mut EditorState) -> ActionResult<()> {
        let (dx, dy) = self.offset;
        for &id in self.roots.iter().rev() {
            state.hide_subtree(id)?;
            state.composition.detach(id)?;
            state.composition.move_by(id, -dx, -dy)?;
        }
        Ok(())
    }

    fn kind(&self) -> ActionKind {
        ActionKind::Paste
    }

    fn description(&self) -> String {
        format!("Paste {}", count(self.roots.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::Rect;
    use crate::config::EditorConfig;
    use crate::host::{FixedViewport, MemoryClipboard, MemorySurface, RecordingSink};

    struct Fixture {
        state: EditorState,
        surface: MemorySurface,
        clipboard: MemoryClipboard,
        viewport: FixedViewport,
    }

    fn fixture() -> Fixture {
        let surface = MemorySurface::new();
        let clipboard = MemoryClipboard::new();
        let viewport = FixedViewport::default();
        let state = EditorState::new(
            Composition::with_config(&EditorConfig::default()),
            Box::new(surface.clone()),
            Box::new(clipboard.clone()),
            Box::new(viewport.clone()),
            Box::new(RecordingSink::new()),
        );
        Fixture {
            state,
            surface,
            clipboard,
            viewport,
        }
    }

    fn add_notes(state: &mut EditorState, xs: &[i32]) -> Vec<ObjectId> {
        let ids: Vec<ObjectId> = xs
            .iter()
            .map(|&x| state.composition.create_note(x, 60, 100, Instrument::Piano))
            .collect();
        AddAction::new(ids.clone()).execute(state).unwrap();
        ids
    }

    #[test]
    fn test_add_and_undo() {
        let mut f = fixture();
        let id = f.state.composition.create_note(0, 60, 100, Instrument::Piano);
        let mut action = AddAction::new(vec![id]);

        action.execute(&mut f.state).unwrap();
        assert_eq!(f.state.composition.top_level(), &[id]);
        assert!(f.surface.is_visible(id));

        action.undo(&mut f.state).unwrap();
        assert!(f.state.composition.is_empty());
        assert!(!f.surface.is_visible(id));

        action.redo(&mut f.state).unwrap();
        assert_eq!(f.state.composition.top_level(), &[id]);
    }

    #[test]
    fn test_add_twice_fails_cleanly() {
        let mut f = fixture();
        let ids = add_notes(&mut f.state, &[0]);
        let fresh = f.state.composition.create_note(200, 60, 100, Instrument::Piano);

        let mut action = AddAction::new(vec![fresh, ids[0]]);
        assert!(action.execute(&mut f.state).is_err());
        // The valid object was not attached either
        assert!(!f.state.composition.is_attached(fresh));
    }

    #[test]
    fn test_delete_restores_slot_inside_gesture() {
        let mut f = fixture();
        let ids = add_notes(&mut f.state, &[0, 200, 400]);
        let gesture = f.state.composition.group(&ids).unwrap();
        let before = f.state.composition.snapshot();

        let mut action = DeleteAction::new(vec![ids[1]]);
        action.execute(&mut f.state).unwrap();
        assert_eq!(
            f.state.composition.get(gesture).unwrap().children(),
            &[ids[0], ids[2]]
        );
        assert!(!f.surface.is_visible(ids[1]));

        action.undo(&mut f.state).unwrap();
        assert_eq!(f.state.composition.snapshot(), before);
        assert!(f.surface.is_visible(ids[1]));
    }

    #[test]
    fn test_delete_detached_object_fails() {
        let mut f = fixture();
        let id = f.state.composition.create_note(0, 0, 100, Instrument::Piano);
        assert!(DeleteAction::new(vec![id]).execute(&mut f.state).is_err());
    }

    #[test]
    fn test_move_step_accumulates() {
        let mut f = fixture();
        let ids = add_notes(&mut f.state, &[0]);
        let mut action = MoveAction::new(ids.clone(), 0, 0);
        assert!(action.is_empty());

        action.step(&mut f.state, 20, 0).unwrap();
        action.step(&mut f.state, 20, 10).unwrap();
        assert_eq!(action.delta(), (40, 10));
        assert_eq!(
            f.state.composition.get(ids[0]).unwrap().bounds(),
            Rect::new(40, 70, 100, 10)
        );

        action.undo(&mut f.state).unwrap();
        assert_eq!(
            f.state.composition.get(ids[0]).unwrap().bounds(),
            Rect::new(0, 60, 100, 10)
        );
        action.redo(&mut f.state).unwrap();
        assert_eq!(f.state.composition.get(ids[0]).unwrap().bounds().x, 40);
    }

    #[test]
    fn test_length_change_restores_clamped_notes() {
        let mut f = fixture();
        let a = f.state.composition.create_note(0, 60, 20, Instrument::Piano);
        let b = f.state.composition.create_note(200, 60, 100, Instrument::Piano);
        AddAction::new(vec![a, b]).execute(&mut f.state).unwrap();

        let mut action = LengthChangeAction::new(vec![a, b], -30);
        action.execute(&mut f.state).unwrap();
        // a would drop to -10, so it keeps its length
        assert_eq!(f.state.composition.get(a).unwrap().duration(), 20);
        assert_eq!(f.state.composition.get(b).unwrap().duration(), 70);

        action.undo(&mut f.state).unwrap();
        assert_eq!(f.state.composition.get(b).unwrap().duration(), 100);

        action.redo(&mut f.state).unwrap();
        assert_eq!(f.state.composition.get(a).unwrap().duration(), 20);
        assert_eq!(f.state.composition.get(b).unwrap().duration(), 70);
    }

    #[test]
    fn test_selection_undo_restores_each_flag() {
        let mut f = fixture();
        let ids = add_notes(&mut f.state, &[0, 200]);
        f.state.composition.unselect(ids[1]).unwrap();

        let mut action = SelectionAction::unselect(ids.clone());
        action.execute(&mut f.state).unwrap();
        assert!(f.state.composition.current_selection().is_empty());
        assert_eq!(action.kind(), ActionKind::Unselect);

        action.undo(&mut f.state).unwrap();
        assert_eq!(f.state.composition.current_selection(), vec![ids[0]]);
    }

    #[test]
    fn test_change_instrument_captures_at_construction() {
        let mut f = fixture();
        let ids = add_notes(&mut f.state, &[0, 200]);
        f.state
            .composition
            .set_instrument(ids[1], Instrument::Marimba)
            .unwrap();

        let mut action =
            ChangeInstrumentAction::new(&f.state.composition, ids.clone(), Instrument::Violin)
                .unwrap();
        action.execute(&mut f.state).unwrap();
        assert_eq!(
            f.state.composition.get(ids[0]).unwrap().instrument(),
            Some(Instrument::Violin)
        );

        action.undo(&mut f.state).unwrap();
        assert_eq!(
            f.state.composition.get(ids[0]).unwrap().instrument(),
            Some(Instrument::Piano)
        );
        assert_eq!(
            f.state.composition.get(ids[1]).unwrap().instrument(),
            Some(Instrument::Marimba)
        );
    }

    #[test]
    fn test_group_reuses_gesture_on_redo() {
        let mut f = fixture();
        let ids = add_notes(&mut f.state, &[0, 200, 400]);
        let before = f.state.composition.snapshot();

        let mut action = GroupAction::new(vec![ids[0], ids[2]]);
        action.execute(&mut f.state).unwrap();
        let gesture = action.gesture().unwrap();
        assert!(f.surface.is_visible(gesture));

        action.undo(&mut f.state).unwrap();
        assert_eq!(f.state.composition.snapshot(), before);
        assert!(!f.surface.is_visible(gesture));

        action.redo(&mut f.state).unwrap();
        assert_eq!(action.gesture(), Some(gesture));
        assert_eq!(f.state.composition.top_level(), &[gesture, ids[1]]);
    }

    #[test]
    fn test_failed_group_creates_no_gesture() {
        let mut f = fixture();
        let count_before = f.state.composition.object_count();
        let mut action = GroupAction::new(Vec::new());

        assert!(action.execute(&mut f.state).is_err());
        assert_eq!(f.state.composition.object_count(), count_before);
    }

    #[test]
    fn test_ungroup_and_undo() {
        let mut f = fixture();
        let ids = add_notes(&mut f.state, &[0, 200, 400]);
        let gesture = f.state.composition.group(&ids[..2]).unwrap();
        f.state.show(gesture).unwrap();
        f.state.composition.unselect(ids[0]).unwrap();
        let before = f.state.composition.snapshot();

        let mut action = UngroupAction::new(gesture);
        action.execute(&mut f.state).unwrap();
        assert_eq!(f.state.composition.top_level(), &[ids[0], ids[1], ids[2]]);
        assert!(!f.surface.is_visible(gesture));

        action.undo(&mut f.state).unwrap();
        assert_eq!(f.state.composition.snapshot(), before);
        assert!(f.surface.is_visible(gesture));
    }

    #[test]
    fn test_copy_writes_clipboard() {
        let mut f = fixture();
        let ids = add_notes(&mut f.state, &[0]);
        let mut action = CopyAction::new(ids);

        action.execute(&mut f.state).unwrap();
        let text = f.clipboard.contents().unwrap();
        assert!(text.contains("Note"));

        // Undo leaves the clipboard alone
        action.undo(&mut f.state).unwrap();
        assert_eq!(f.clipboard.contents(), Some(text));
    }

    #[test]
    fn test_paste_shifts_by_scroll_offset() {
        let mut f = fixture();
        let ids = add_notes(&mut f.state, &[0]);
        CopyAction::new(ids.clone()).execute(&mut f.state).unwrap();
        f.viewport.scroll_to(40, 20);

        let mut action = PasteAction::from_clipboard(&mut f.state).unwrap();
        let pasted = action.roots().to_vec();
        action.execute(&mut f.state).unwrap();

        assert_eq!(pasted.len(), 1);
        assert_ne!(pasted[0], ids[0]);
        assert_eq!(
            f.state.composition.get(pasted[0]).unwrap().bounds(),
            Rect::new(40, 80, 100, 10)
        );

        action.undo(&mut f.state).unwrap();
        assert_eq!(f.state.composition.top_level(), &[ids[0]]);

        action.redo(&mut f.state).unwrap();
        assert_eq!(
            f.state.composition.get(pasted[0]).unwrap().bounds(),
            Rect::new(40, 80, 100, 10)
        );
    }

    #[test]
    fn test_paste_rejects_overflowing_offset() {
        let mut f = fixture();
        let ids = add_notes(&mut f.state, &[0]);
        CopyAction::new(ids.clone()).execute(&mut f.state).unwrap();
        f.viewport.scroll_to(i32::MAX - 50, 0);

        let mut action = PasteAction::from_clipboard(&mut f.state).unwrap();
        let before = f.state.composition.snapshot();

        assert!(matches!(
            action.execute(&mut f.state),
            Err(ActionError::Clipboard(ClipboardError::InvalidGeometry(_)))
        ));
        assert_eq!(f.state.composition.snapshot(), before);
        assert!(!f.surface.is_visible(action.roots()[0]));
    }

    #[test]
    fn test_paste_from_empty_clipboard() {
        let mut f = fixture();
        assert!(matches!(
            PasteAction::from_clipboard(&mut f.state),
            Err(ActionError::Clipboard(ClipboardError::EmptyClipboard))
        ));
    }
}
