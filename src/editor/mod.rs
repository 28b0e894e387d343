// Editor - Command surface over the composition and its history
//
// Menu commands and pointer input end up here. Each command builds one
// compound action list from the current selection and hands it to the
// ActionManager. Playback is stopped before anything is mutated.

pub mod enablement;
pub mod pointer;

use crate::action::{
    Action, ActionManager, ActionResult, AddAction, ChangeInstrumentAction, CompoundAction,
    CopyAction, DeleteAction, EditorState, GroupAction, LengthChangeAction, MoveAction,
    PasteAction, SelectionAction, UngroupAction,
};
use crate::composition::{Composition, Instrument, ObjectId, Rect};
use crate::config::EditorConfig;
use crate::host::{Clipboard, PlaybackSink, RenderSurface, Viewport};
use crate::playback;

pub use enablement::Availability;
pub use pointer::DragMode;

use pointer::PointerSession;

/// Interactive editor for one document session
pub struct Editor {
    state: EditorState,
    history: ActionManager,
    config: EditorConfig,
    /// Instrument given to newly placed notes
    instrument: Instrument,
    pointer: Option<PointerSession>,
}

impl Editor {
    pub fn new(
        config: EditorConfig,
        surface: Box<dyn RenderSurface>,
        clipboard: Box<dyn Clipboard>,
        viewport: Box<dyn Viewport>,
        playback: Box<dyn PlaybackSink>,
    ) -> Self {
        let state = EditorState::new(
            Composition::with_config(&config),
            surface,
            clipboard,
            viewport,
            playback,
        );
        Self::from_state(config, state)
    }

    /// Editor backed by in-memory collaborators
    pub fn headless(config: EditorConfig) -> Self {
        let state = EditorState::headless(&config);
        Self::from_state(config, state)
    }

    fn from_state(config: EditorConfig, state: EditorState) -> Self {
        Self {
            history: ActionManager::with_capacity(config.history_limit),
            instrument: config.default_instrument,
            state,
            config,
            pointer: None,
        }
    }

    pub fn composition(&self) -> &Composition {
        &self.state.composition
    }

    pub fn history(&self) -> &ActionManager {
        &self.history
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn instrument(&self) -> Instrument {
        self.instrument
    }

    /// Choose the instrument for notes placed from now on
    pub fn set_instrument(&mut self, instrument: Instrument) {
        self.instrument = instrument;
    }

    /// Enabled state of the menu commands
    pub fn availability(&self) -> Availability {
        Availability::compute(&self.state.composition, &self.history)
    }

    fn execute(&mut self, list: CompoundAction) -> ActionResult<()> {
        self.history.execute(list, &mut self.state)
    }

    fn single(action: impl Action + 'static) -> CompoundAction {
        let mut list = CompoundAction::new();
        list.push(action);
        list
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    /// Undo the last command; `None` when there was nothing to undo
    pub fn undo(&mut self) -> ActionResult<Option<String>> {
        self.stop();
        self.history.undo(&mut self.state)
    }

    /// Redo the last undone command; `None` when there was nothing to redo
    pub fn redo(&mut self) -> ActionResult<Option<String>> {
        self.stop();
        self.history.redo(&mut self.state)
    }

    /// Start a fresh document: empty pane, empty history
    pub fn new_document(&mut self) {
        self.stop();
        self.pointer = None;
        for root in self.state.composition.top_level().to_vec() {
            if let Err(e) = self.state.hide_subtree(root) {
                log::warn!("Could not remove visual of {}: {}", root, e);
            }
        }
        self.state.composition.clear();
        self.history.clear();
        log::info!("Started a new document");
    }

    // ------------------------------------------------------------------
    // Clipboard
    // ------------------------------------------------------------------

    /// Copy the selection to the clipboard
    pub fn copy(&mut self) -> ActionResult<()> {
        let selection = self.state.composition.current_selection();
        if selection.is_empty() {
            return Ok(());
        }
        self.execute(Self::single(CopyAction::new(selection)))
    }

    /// Copy the selection, then delete it
    pub fn cut(&mut self) -> ActionResult<()> {
        self.stop();
        let selection = self.state.composition.current_selection();
        if selection.is_empty() {
            return Ok(());
        }
        let mut list = CompoundAction::with_label("Cut");
        list.push(CopyAction::new(selection.clone()));
        list.push(DeleteAction::new(selection));
        self.execute(list)
    }

    /// Paste the clipboard, shifted by the current scroll offset
    ///
    /// The pasted objects replace the selection. Malformed clipboard text is
    /// rejected without touching the pane or the history.
    pub fn paste(&mut self) -> ActionResult<Vec<ObjectId>> {
        self.stop();
        let paste = PasteAction::from_clipboard(&mut self.state)?;
        let roots = paste.roots().to_vec();

        let mut list = CompoundAction::new();
        let selection = self.state.composition.current_selection();
        if !selection.is_empty() {
            list.push(SelectionAction::unselect(selection));
        }
        list.push(paste);
        self.execute(list)?;
        Ok(roots)
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    pub fn select_all(&mut self) -> ActionResult<()> {
        let unselected = self.state.composition.unselected_objects();
        if unselected.is_empty() {
            return Ok(());
        }
        self.execute(Self::single(SelectionAction::select(unselected)))
    }

    /// Click on an object: select it alone, or toggle it when ctrl is held
    pub fn click_select(&mut self, id: ObjectId, ctrl: bool) -> ActionResult<()> {
        let list = self.click_selection_actions(id, ctrl)?;
        self.execute(list)
    }

    /// Build the selection changes for a click on `id`
    fn click_selection_actions(&self, id: ObjectId, ctrl: bool) -> ActionResult<CompoundAction> {
        let composition = &self.state.composition;
        let mut list = CompoundAction::new();
        if !composition.is_selected(id)? {
            if !ctrl {
                let others: Vec<ObjectId> = composition
                    .current_selection()
                    .into_iter()
                    .filter(|&other| other != id)
                    .collect();
                if !others.is_empty() {
                    list.push(SelectionAction::unselect(others));
                }
            }
            list.push(SelectionAction::select(vec![id]));
        } else if ctrl {
            list.push(SelectionAction::unselect(vec![id]));
        }
        Ok(list)
    }

    /// Rubber-band selection over `area`
    ///
    /// Without ctrl the previous selection is dropped first.
    pub fn select_area(&mut self, area: Rect, ctrl: bool) -> ActionResult<()> {
        let hits = self.state.composition.objects_in(&area);
        let mut list = CompoundAction::new();
        if !ctrl {
            let others: Vec<ObjectId> = self
                .state
                .composition
                .current_selection()
                .into_iter()
                .filter(|id| !hits.contains(id))
                .collect();
            if !others.is_empty() {
                list.push(SelectionAction::unselect(others));
            }
        }
        if !hits.is_empty() {
            list.push(SelectionAction::select(hits));
        }
        self.execute(list)
    }

    // ------------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------------

    /// Place a new note at a pane position and make it the only selection
    ///
    /// The note lands on the nearest pitch row and gets the default length and
    /// the current instrument.
    pub fn place_note(&mut self, x: i32, y: i32) -> ActionResult<ObjectId> {
        self.stop();
        let composition = &mut self.state.composition;
        let row = composition.grid().snap_y(y);
        let note = composition.create_note(x, row, self.config.default_note_length, self.instrument);

        let mut list = CompoundAction::new();
        let selection = composition.current_selection();
        if !selection.is_empty() {
            list.push(SelectionAction::unselect(selection));
        }
        list.push(AddAction::new(vec![note]));
        self.execute(list)?;
        Ok(note)
    }

    pub fn delete(&mut self) -> ActionResult<()> {
        self.stop();
        let selection = self.state.composition.current_selection();
        if selection.is_empty() {
            return Ok(());
        }
        self.execute(Self::single(DeleteAction::new(selection)))
    }

    /// Move the selection; returns false when the move would leave the pane
    pub fn move_selection(&mut self, dx: i32, dy: i32) -> ActionResult<bool> {
        self.stop();
        let selection = self.state.composition.current_selection();
        if selection.is_empty() || (dx == 0 && dy == 0) {
            return Ok(false);
        }
        if self.would_leave_pane(&selection, dx, dy)? {
            log::warn!("Move by ({}, {}) vetoed at the pane edge", dx, dy);
            return Ok(false);
        }
        self.execute(Self::single(MoveAction::new(selection, dx, dy)))?;
        Ok(true)
    }

    fn would_leave_pane(&self, ids: &[ObjectId], dx: i32, dy: i32) -> ActionResult<bool> {
        for &id in ids {
            if self.state.composition.is_on_edge(id, dx, dy)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Grow or shrink every selected note
    pub fn change_selection_length(&mut self, delta: i32) -> ActionResult<()> {
        self.stop();
        let selection = self.state.composition.current_selection();
        if selection.is_empty() || delta == 0 {
            return Ok(());
        }
        self.execute(Self::single(LengthChangeAction::new(selection, delta)))
    }

    pub fn change_instrument(&mut self, instrument: Instrument) -> ActionResult<()> {
        self.stop();
        let selection = self.state.composition.current_selection();
        if selection.is_empty() {
            return Ok(());
        }
        let action = ChangeInstrumentAction::new(&self.state.composition, selection, instrument)?;
        self.execute(Self::single(action))
    }

    /// Group the selection into a new gesture
    pub fn group(&mut self) -> ActionResult<()> {
        self.stop();
        let selection = self.state.composition.current_selection();
        if selection.is_empty() {
            return Ok(());
        }
        self.execute(Self::single(GroupAction::new(selection)))
    }

    /// Dissolve every selected gesture
    pub fn ungroup(&mut self) -> ActionResult<()> {
        self.stop();
        let composition = &self.state.composition;
        let mut list = CompoundAction::new();
        for id in composition.current_selection() {
            if composition.get(id)?.is_gesture() {
                list.push(UngroupAction::new(id));
            }
        }
        self.execute(list)
    }

    // ------------------------------------------------------------------
    // Playback
    // ------------------------------------------------------------------

    /// Send every note to the playback sink and start playing
    pub fn play(&mut self) {
        self.stop();
        let events = playback::collect_events(&self.state.composition);
        let end = self.state.composition.composition_end();
        let sink = &mut self.state.playback;
        sink.clear();
        for event in &events {
            sink.add_event(*event);
        }
        sink.play(end);
        log::info!("Playing {} notes up to tick {}", events.len(), end);
    }

    pub fn stop(&mut self) {
        self.state.playback.stop();
    }
}
