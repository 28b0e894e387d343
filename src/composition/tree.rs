// Composition - Arena-backed tree of sound objects
//
// The composition owns every sound object ever created during a document
// session. Gestures own their children through ordered id lists, children point
// back to their gesture by id. Objects are detached rather than destroyed so
// that history entries can attach them again.

use crate::composition::geometry::{Grid, Rect};
use crate::composition::instrument::Instrument;
use crate::composition::object::{ObjectId, SoundObject, SoundObjectKind};
use crate::config::EditorConfig;
use serde::Serialize;

/// Errors raised by structural tree operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompositionError {
    #[error("Unknown sound object {0}")]
    UnknownObject(ObjectId),

    #[error("Sound object {0} is not a top-level object on the pane")]
    NotTopLevel(ObjectId),

    #[error("Sound object {0} is not a gesture")]
    NotAGesture(ObjectId),

    #[error("Sound object {0} is already attached")]
    AlreadyAttached(ObjectId),

    #[error("Sound object {0} is not attached")]
    NotAttached(ObjectId),

    #[error("Gesture {0} already has children")]
    GestureNotEmpty(ObjectId),

    #[error("Cannot build a gesture without members")]
    EmptyGroup,

    #[error("Sound object {0} listed twice")]
    DuplicateMember(ObjectId),
}

/// Result type for tree operations
pub type CompositionResult<T> = Result<T, CompositionError>;

/// Position an object occupied in its container before being detached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Owning gesture, `None` for the pane
    pub parent: Option<ObjectId>,
    /// Index among the container's children
    pub index: usize,
}

/// Observable state of one attached object
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectSnapshot {
    pub id: ObjectId,
    pub parent: Option<ObjectId>,
    pub bounds: Rect,
    pub selected: bool,
    pub instrument: Option<Instrument>,
    pub children: Vec<ObjectId>,
}

/// Observable state of the attached tree, in pane order (pre-order)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompositionSnapshot {
    pub top_level: Vec<ObjectId>,
    pub objects: Vec<ObjectSnapshot>,
}

/// Root of the sound object tree
#[derive(Debug, Clone)]
pub struct Composition {
    /// Every object of the session, indexed by `ObjectId`
    pub(crate) objects: Vec<SoundObject>,
    /// Attached top-level objects in pane order (later = drawn on top)
    pub(crate) top_level: Vec<ObjectId>,
    grid: Grid,
}

impl Composition {
    /// Create an empty composition using the given grid
    pub fn new(grid: Grid) -> Self {
        Self {
            objects: Vec::new(),
            top_level: Vec::new(),
            grid,
        }
    }

    /// Create an empty composition from editor settings
    pub fn with_config(config: &EditorConfig) -> Self {
        Self::new(Grid::from(config))
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Drop every object, detached ones included
    pub fn clear(&mut self) {
        self.objects.clear();
        self.top_level.clear();
    }

    /// Look up an object by id
    pub fn get(&self, id: ObjectId) -> CompositionResult<&SoundObject> {
        self.objects
            .get(id.0)
            .ok_or(CompositionError::UnknownObject(id))
    }

    /// Attached top-level objects in pane order
    pub fn top_level(&self) -> &[ObjectId] {
        &self.top_level
    }

    /// True when nothing is attached to the pane
    pub fn is_empty(&self) -> bool {
        self.top_level.is_empty()
    }

    /// Number of objects in the arena, attached or not
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    // ------------------------------------------------------------------
    // Creation
    // ------------------------------------------------------------------

    /// Create a detached note; it becomes visible once attached
    pub fn create_note(&mut self, x: i32, y: i32, length: i32, instrument: Instrument) -> ObjectId {
        let bounds = Rect::new(x, y, length, self.grid.row_height);
        self.create_note_with_bounds(bounds, instrument)
    }

    pub(crate) fn create_note_with_bounds(&mut self, bounds: Rect, instrument: Instrument) -> ObjectId {
        let id = ObjectId(self.objects.len());
        self.objects.push(SoundObject::new_note(id, bounds, instrument));
        id
    }

    /// Create a detached, empty gesture
    pub fn create_gesture(&mut self) -> ObjectId {
        let id = ObjectId(self.objects.len());
        self.objects.push(SoundObject::new_gesture(id));
        id
    }

    // ------------------------------------------------------------------
    // Tree queries
    // ------------------------------------------------------------------

    /// Enclosing gestures from the nearest to the root
    ///
    /// # Panics
    /// Panics if the parent chain loops, which means the ownership forest
    /// has been corrupted.
    pub fn ancestors(&self, id: ObjectId) -> CompositionResult<Vec<ObjectId>> {
        let mut chain = Vec::new();
        let mut current = self.get(id)?.parent;
        while let Some(parent) = current {
            assert!(
                chain.len() <= self.objects.len(),
                "ownership cycle detected above sound object {}",
                id
            );
            chain.push(parent);
            current = self.get(parent)?.parent;
        }
        Ok(chain)
    }

    /// Outermost gesture containing `id`, or `id` itself for a root
    pub fn root_of(&self, id: ObjectId) -> CompositionResult<ObjectId> {
        Ok(self.ancestors(id)?.last().copied().unwrap_or(id))
    }

    /// True when the object's root is on the pane
    pub fn is_attached(&self, id: ObjectId) -> bool {
        self.root_of(id)
            .map(|root| self.top_level.contains(&root))
            .unwrap_or(false)
    }

    /// Every object nested below `id` in pre-order, `id` excluded
    pub fn collect_descendants(&self, id: ObjectId) -> CompositionResult<Vec<ObjectId>> {
        let mut out = Vec::new();
        for &child in self.get(id)?.children() {
            out.push(child);
            out.extend(self.collect_descendants(child)?);
        }
        Ok(out)
    }

    /// `id` followed by its descendants
    pub fn subtree(&self, id: ObjectId) -> CompositionResult<Vec<ObjectId>> {
        let mut out = vec![id];
        out.extend(self.collect_descendants(id)?);
        Ok(out)
    }

    /// Notes contained in `id` (or `id` itself when it is a note)
    pub fn leaves(&self, id: ObjectId) -> CompositionResult<Vec<ObjectId>> {
        let mut out = Vec::new();
        for object in self.subtree(id)? {
            if !self.objects[object.0].is_gesture() {
                out.push(object);
            }
        }
        Ok(out)
    }

    /// All attached notes in pane order
    pub fn notes(&self) -> Vec<ObjectId> {
        self.top_level
            .iter()
            .flat_map(|&root| self.leaves(root).unwrap_or_default())
            .collect()
    }

    /// Topmost top-level object with a note under the point
    pub fn object_at(&self, x: i32, y: i32) -> Option<ObjectId> {
        self.top_level.iter().rev().copied().find(|&root| {
            self.leaves(root)
                .unwrap_or_default()
                .iter()
                .any(|&leaf| self.objects[leaf.0].bounds.contains_point(x, y))
        })
    }

    /// Top-level objects with at least one note overlapping `area`
    pub fn objects_in(&self, area: &Rect) -> Vec<ObjectId> {
        self.top_level
            .iter()
            .copied()
            .filter(|&root| {
                self.leaves(root)
                    .unwrap_or_default()
                    .iter()
                    .any(|&leaf| self.objects[leaf.0].bounds.intersects(area))
            })
            .collect()
    }

    /// Right edge of the last-ending attached object (0 for an empty pane)
    pub fn composition_end(&self) -> i32 {
        self.top_level
            .iter()
            .map(|&root| self.objects[root.0].bounds.right())
            .max()
            .unwrap_or(0)
    }

    /// Capture the observable state of the attached tree
    pub fn snapshot(&self) -> CompositionSnapshot {
        let mut objects = Vec::new();
        for &root in &self.top_level {
            for id in self.subtree(root).unwrap_or_default() {
                let object = &self.objects[id.0];
                objects.push(ObjectSnapshot {
                    id,
                    parent: object.parent,
                    bounds: object.bounds,
                    selected: object.selected,
                    instrument: object.instrument(),
                    children: object.children().to_vec(),
                });
            }
        }
        CompositionSnapshot {
            top_level: self.top_level.clone(),
            objects,
        }
    }

    // ------------------------------------------------------------------
    // Attachment
    // ------------------------------------------------------------------

    /// Append a detached root to the end of the pane
    pub fn attach(&mut self, id: ObjectId) -> CompositionResult<()> {
        let index = self.top_level.len();
        self.attach_at(
            id,
            Placement {
                parent: None,
                index,
            },
        )
    }

    /// Put a detached root back into a container
    ///
    /// The index is clamped to the container's length.
    pub fn attach_at(&mut self, id: ObjectId, placement: Placement) -> CompositionResult<()> {
        let object = self.get(id)?;
        if object.parent.is_some() || self.top_level.contains(&id) {
            return Err(CompositionError::AlreadyAttached(id));
        }

        match placement.parent {
            None => {
                let index = placement.index.min(self.top_level.len());
                self.top_level.insert(index, id);
            }
            Some(gesture) => {
                if gesture == id || self.subtree(id)?.contains(&gesture) {
                    return Err(CompositionError::AlreadyAttached(gesture));
                }
                let children = self.gesture_children_mut(gesture)?;
                let index = placement.index.min(children.len());
                children.insert(index, id);
                self.objects[id.0].parent = Some(gesture);
                self.refresh_upwards(gesture);
                self.refresh_selection_upwards(id);
            }
        }
        log::debug!("Attached {} at {:?}", id, placement);
        Ok(())
    }

    /// Remove an object from its container and report where it was
    pub fn detach(&mut self, id: ObjectId) -> CompositionResult<Placement> {
        let parent = self.get(id)?.parent;
        let placement = match parent {
            None => {
                let index = self
                    .top_level
                    .iter()
                    .position(|&top| top == id)
                    .ok_or(CompositionError::NotAttached(id))?;
                self.top_level.remove(index);
                Placement {
                    parent: None,
                    index,
                }
            }
            Some(gesture) => {
                let children = self.gesture_children_mut(gesture)?;
                let index = children
                    .iter()
                    .position(|&child| child == id)
                    .ok_or(CompositionError::NotAttached(id))?;
                children.remove(index);
                self.objects[id.0].parent = None;
                self.refresh_upwards(gesture);
                self.refresh_gesture_selection(gesture);
                for ancestor in self.ancestors(gesture)? {
                    self.refresh_gesture_selection(ancestor);
                }
                Placement {
                    parent: Some(gesture),
                    index,
                }
            }
        };
        log::debug!("Detached {} from {:?}", id, placement);
        Ok(placement)
    }

    // ------------------------------------------------------------------
    // Grouping
    // ------------------------------------------------------------------

    /// Build a new gesture over top-level `members`
    pub fn group(&mut self, members: &[ObjectId]) -> CompositionResult<ObjectId> {
        self.validate_members(members)?;
        let gesture = self.create_gesture();
        self.group_into(gesture, members)?;
        Ok(gesture)
    }

    /// Fill the detached, empty `gesture` with top-level `members`
    ///
    /// The gesture takes the pane slot of the first member, its box becomes the
    /// union of the members and it ends up selected. Returns the members'
    /// previous pane indices, in member order.
    pub fn group_into(
        &mut self,
        gesture: ObjectId,
        members: &[ObjectId],
    ) -> CompositionResult<Vec<usize>> {
        let object = self.get(gesture)?;
        if !object.is_gesture() {
            return Err(CompositionError::NotAGesture(gesture));
        }
        if object.parent.is_some() || self.top_level.contains(&gesture) {
            return Err(CompositionError::AlreadyAttached(gesture));
        }
        if !object.children().is_empty() {
            return Err(CompositionError::GestureNotEmpty(gesture));
        }
        if members.contains(&gesture) {
            return Err(CompositionError::DuplicateMember(gesture));
        }
        let prior_indices = self.validate_members(members)?;

        self.top_level.retain(|top| !members.contains(top));
        let slot = prior_indices.iter().copied().min().unwrap_or(0);
        self.top_level.insert(slot.min(self.top_level.len()), gesture);

        for &member in members {
            self.objects[member.0].parent = Some(gesture);
        }
        if let SoundObjectKind::Gesture(g) = &mut self.objects[gesture.0].kind {
            g.children = members.to_vec();
        }
        self.refresh_bounds(gesture);
        self.select(gesture)?;

        log::debug!("Grouped {:?} into gesture {}", members, gesture);
        Ok(prior_indices)
    }

    /// Dissolve a top-level gesture; its children take its pane slot in order
    ///
    /// Children keep their absolute positions and selection. The emptied
    /// gesture stays in the arena, detached.
    pub fn ungroup(&mut self, gesture: ObjectId) -> CompositionResult<Vec<ObjectId>> {
        if !self.get(gesture)?.is_gesture() {
            return Err(CompositionError::NotAGesture(gesture));
        }
        let slot = self
            .top_level
            .iter()
            .position(|&top| top == gesture)
            .ok_or(CompositionError::NotTopLevel(gesture))?;

        let children = match &mut self.objects[gesture.0].kind {
            SoundObjectKind::Gesture(g) => std::mem::take(&mut g.children),
            SoundObjectKind::Note(_) => Vec::new(),
        };
        self.top_level.remove(slot);
        for (offset, &child) in children.iter().enumerate() {
            self.objects[child.0].parent = None;
            self.top_level.insert(slot + offset, child);
        }

        log::debug!("Ungrouped gesture {} into {:?}", gesture, children);
        Ok(children)
    }

    /// Dissolve a gesture and put its children back at explicit pane indices
    ///
    /// `indices` are the values returned by [`Composition::group_into`].
    pub fn ungroup_to(
        &mut self,
        gesture: ObjectId,
        indices: &[usize],
    ) -> CompositionResult<Vec<ObjectId>> {
        let children = self.ungroup(gesture)?;
        if indices.len() != children.len() {
            return Ok(children);
        }

        self.top_level.retain(|top| !children.contains(top));
        let mut order: Vec<(usize, ObjectId)> =
            indices.iter().copied().zip(children.iter().copied()).collect();
        order.sort_by_key(|(index, _)| *index);
        for (index, child) in order {
            let index = index.min(self.top_level.len());
            self.top_level.insert(index, child);
        }
        Ok(children)
    }

    /// Check that members are distinct attached top-level objects and
    /// return their pane indices
    pub(crate) fn validate_members(&self, members: &[ObjectId]) -> CompositionResult<Vec<usize>> {
        if members.is_empty() {
            return Err(CompositionError::EmptyGroup);
        }
        let mut indices = Vec::with_capacity(members.len());
        for (i, &member) in members.iter().enumerate() {
            self.get(member)?;
            if members[..i].contains(&member) {
                return Err(CompositionError::DuplicateMember(member));
            }
            let index = self
                .top_level
                .iter()
                .position(|&top| top == member)
                .ok_or(CompositionError::NotTopLevel(member))?;
            indices.push(index);
        }
        Ok(indices)
    }

    // ------------------------------------------------------------------
    // Geometry
    // ------------------------------------------------------------------

    /// Shift an object (and everything it contains) by the given offsets
    ///
    /// No clamping is applied; callers veto illegal moves with
    /// [`Composition::is_on_edge`] first.
    pub fn move_by(&mut self, id: ObjectId, dx: i32, dy: i32) -> CompositionResult<()> {
        self.get(id)?;
        self.translate_subtree(id, dx, dy);
        self.refresh_ancestors(id)?;
        Ok(())
    }

    fn translate_subtree(&mut self, id: ObjectId, dx: i32, dy: i32) {
        let children = self.objects[id.0].children().to_vec();
        if children.is_empty() {
            let object = &mut self.objects[id.0];
            object.bounds = object.bounds.translated(dx, dy);
            return;
        }
        for child in children {
            self.translate_subtree(child, dx, dy);
        }
        self.refresh_bounds(id);
    }

    /// True when moving `id` by (dx, dy) would push part of it off the pane
    pub fn is_on_edge(&self, id: ObjectId, dx: i32, dy: i32) -> CompositionResult<bool> {
        let moved = self.get(id)?.bounds.translated(dx, dy);
        Ok(!self.grid.pane().contains_rect(&moved))
    }

    /// Grow or shrink every note in `id` by `delta`
    ///
    /// A note whose new length would not exceed the minimum keeps its length.
    pub fn change_length(&mut self, id: ObjectId, delta: i32) -> CompositionResult<()> {
        let min = self.grid.min_note_length;
        for leaf in self.leaves(id)? {
            let bounds = &mut self.objects[leaf.0].bounds;
            let length = bounds.width + delta;
            if length > min {
                bounds.width = length;
            }
        }
        self.refresh_subtree(id);
        self.refresh_ancestors(id)?;
        Ok(())
    }

    /// Current length of every note in `id`
    pub fn leaf_lengths(&self, id: ObjectId) -> CompositionResult<Vec<(ObjectId, i32)>> {
        Ok(self
            .leaves(id)?
            .into_iter()
            .map(|leaf| (leaf, self.objects[leaf.0].bounds.width))
            .collect())
    }

    /// Set explicit note lengths (used to restore recorded state)
    pub fn set_leaf_lengths(&mut self, lengths: &[(ObjectId, i32)]) -> CompositionResult<()> {
        for &(leaf, width) in lengths {
            self.get(leaf)?;
            self.objects[leaf.0].bounds.width = width;
        }
        for &(leaf, _) in lengths {
            self.refresh_ancestors(leaf)?;
        }
        Ok(())
    }

    /// Snap every note in `id` onto the grid
    pub fn snap_to_grid(&mut self, id: ObjectId) -> CompositionResult<()> {
        let grid = self.grid;
        for leaf in self.leaves(id)? {
            let bounds = &mut self.objects[leaf.0].bounds;
            bounds.x = grid.snap_x(bounds.x);
            bounds.y = grid.snap_y(bounds.y);
        }
        self.refresh_subtree(id);
        self.refresh_ancestors(id)?;
        Ok(())
    }

    /// Current instrument of every note in `id`
    pub fn leaf_instruments(&self, id: ObjectId) -> CompositionResult<Vec<(ObjectId, Instrument)>> {
        Ok(self
            .leaves(id)?
            .into_iter()
            .filter_map(|leaf| self.objects[leaf.0].instrument().map(|i| (leaf, i)))
            .collect())
    }

    /// Assign one instrument to every note in `id`
    pub fn set_instrument(&mut self, id: ObjectId, instrument: Instrument) -> CompositionResult<()> {
        for leaf in self.leaves(id)? {
            if let SoundObjectKind::Note(note) = &mut self.objects[leaf.0].kind {
                note.instrument = instrument;
            }
        }
        Ok(())
    }

    /// Restore per-note instruments
    pub fn restore_instruments(&mut self, values: &[(ObjectId, Instrument)]) -> CompositionResult<()> {
        for &(leaf, instrument) in values {
            self.get(leaf)?;
            if let SoundObjectKind::Note(note) = &mut self.objects[leaf.0].kind {
                note.instrument = instrument;
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Derived geometry maintenance
    // ------------------------------------------------------------------

    fn gesture_children_mut(&mut self, gesture: ObjectId) -> CompositionResult<&mut Vec<ObjectId>> {
        match self.objects.get_mut(gesture.0).map(|object| &mut object.kind) {
            Some(SoundObjectKind::Gesture(g)) => Ok(&mut g.children),
            Some(SoundObjectKind::Note(_)) => Err(CompositionError::NotAGesture(gesture)),
            None => Err(CompositionError::UnknownObject(gesture)),
        }
    }

    /// Recompute a gesture's box from its direct children
    ///
    /// An empty gesture keeps its last box.
    fn refresh_bounds(&mut self, id: ObjectId) {
        let object = &self.objects[id.0];
        if !object.is_gesture() {
            return;
        }
        let union = Rect::union_all(
            object
                .children()
                .iter()
                .map(|child| self.objects[child.0].bounds),
        );
        if let Some(bounds) = union {
            self.objects[id.0].bounds = bounds;
        }
    }

    /// Recompute every gesture box inside `id`, deepest first
    fn refresh_subtree(&mut self, id: ObjectId) {
        let children = self.objects[id.0].children().to_vec();
        for child in children {
            self.refresh_subtree(child);
        }
        self.refresh_bounds(id);
    }

    /// Recompute `id` and every enclosing gesture
    fn refresh_upwards(&mut self, id: ObjectId) {
        self.refresh_bounds(id);
        if let Ok(ancestors) = self.ancestors(id) {
            for ancestor in ancestors {
                self.refresh_bounds(ancestor);
            }
        }
    }

    fn refresh_ancestors(&mut self, id: ObjectId) -> CompositionResult<()> {
        for ancestor in self.ancestors(id)? {
            self.refresh_bounds(ancestor);
        }
        Ok(())
    }
}

impl Default for Composition {
    fn default() -> Self {
        Self::new(Grid::default())
    }
}
