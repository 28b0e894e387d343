// Pointer translation - Press/drag/release sequences into history entries
//
// A press on an object adjusts the selection right away, a drag moves or
// resizes the selection live, and the release records everything that
// happened as a single undoable list. A press on empty pane space either
// places a note (click) or draws a selection band (drag).

use crate::action::{ActionResult, CompoundAction, LengthChangeAction, MoveAction};
use crate::composition::{Grid, ObjectId, Rect};
use crate::editor::Editor;

/// What the current drag does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    /// Move the selection in whole grid steps
    Move,
    /// Change the length of the selected notes
    Resize,
    /// Rubber-band selection on empty space
    Band,
}

/// State kept between press and release
pub(crate) struct PointerSession {
    mode: DragMode,
    origin: (i32, i32),
    /// Pointer position the selection was last shifted to
    anchor: (i32, i32),
    ctrl: bool,
    /// Selection changes already applied at press time
    pending: CompoundAction,
    moving: Option<MoveAction>,
    resizing: Option<LengthChangeAction>,
}

impl PointerSession {
    fn new(mode: DragMode, x: i32, y: i32, ctrl: bool) -> Self {
        Self {
            mode,
            origin: (x, y),
            anchor: (x, y),
            ctrl,
            pending: CompoundAction::new(),
            moving: None,
            resizing: None,
        }
    }
}

impl Editor {
    /// Mode of the drag in progress, if any
    pub fn drag_mode(&self) -> Option<DragMode> {
        self.pointer.as_ref().map(|session| session.mode)
    }

    /// Pointer pressed at a pane position
    pub fn pointer_press(&mut self, x: i32, y: i32, ctrl: bool) -> ActionResult<()> {
        self.stop();
        match self.pointer.as_ref().map(|session| session.mode) {
            // Release never arrived; an unfinished band is dropped
            Some(DragMode::Band) => self.pointer = None,
            // Live edits already applied are still recorded
            Some(_) => self.pointer_release(x, y)?,
            None => {}
        }

        let Some(id) = self.state.composition.object_at(x, y) else {
            self.pointer = Some(PointerSession::new(DragMode::Band, x, y, ctrl));
            return Ok(());
        };

        let mode = if self.on_edit_handle(id, x)? {
            DragMode::Resize
        } else {
            DragMode::Move
        };
        let mut session = PointerSession::new(mode, x, y, ctrl);

        let mut selection = self.click_selection_actions(id, ctrl)?;
        selection.execute_all(&mut self.state)?;
        session.pending = selection;

        self.pointer = Some(session);
        Ok(())
    }

    /// Pointer dragged to a pane position
    pub fn pointer_drag(&mut self, x: i32, y: i32) -> ActionResult<()> {
        let Some(mut session) = self.pointer.take() else {
            return Ok(());
        };
        let result = self.drag(&mut session, x, y);
        self.pointer = Some(session);
        result
    }

    fn drag(&mut self, session: &mut PointerSession, x: i32, y: i32) -> ActionResult<()> {
        match session.mode {
            DragMode::Move => {
                let grid = *self.state.composition.grid();
                let dx = Grid::quantize_delta(x - session.anchor.0, grid.snap_x);
                let dy = Grid::quantize_delta(y - session.anchor.1, grid.row_height);
                if dx == 0 && dy == 0 {
                    return Ok(());
                }

                let selection = self.state.composition.current_selection();
                if selection.is_empty() {
                    return Ok(());
                }
                if self.would_leave_pane(&selection, dx, dy)? {
                    log::debug!("Drag step ({}, {}) vetoed at the pane edge", dx, dy);
                    return Ok(());
                }

                let action = session
                    .moving
                    .get_or_insert_with(|| MoveAction::new(selection, 0, 0));
                action.step(&mut self.state, dx, dy)?;
                session.anchor = (session.anchor.0 + dx, session.anchor.1 + dy);
            }
            DragMode::Resize => {
                let delta = x - session.anchor.0;
                if delta == 0 {
                    return Ok(());
                }

                let selection = self.state.composition.current_selection();
                if selection.is_empty() {
                    return Ok(());
                }

                let action = session
                    .resizing
                    .get_or_insert_with(|| LengthChangeAction::new(selection, 0));
                action.step(&mut self.state, delta)?;
                session.anchor.0 = x;
            }
            DragMode::Band => {}
        }
        Ok(())
    }

    /// Pointer released; records or executes the resulting history entry
    pub fn pointer_release(&mut self, x: i32, y: i32) -> ActionResult<()> {
        let Some(mut session) = self.pointer.take() else {
            return Ok(());
        };

        match session.mode {
            DragMode::Move | DragMode::Resize => {
                if let Some(action) = session.moving.take().filter(|a| !a.is_empty()) {
                    session.pending.push(action);
                }
                if let Some(action) = session.resizing.take().filter(|a| !a.is_noop()) {
                    session.pending.push(action);
                }
                self.history.record(session.pending);
            }
            DragMode::Band => {
                let (x0, y0) = session.origin;
                if (x, y) == (x0, y0) {
                    self.place_note(x, y)?;
                } else {
                    self.select_area(Rect::from_corners(x0, y0, x, y), session.ctrl)?;
                }
            }
        }
        Ok(())
    }

    /// True when `x` falls on the resize grip at the right end of a note in `id`
    fn on_edit_handle(&self, id: ObjectId, x: i32) -> ActionResult<bool> {
        let handle = self.config.edit_handle_width;
        let composition = &self.state.composition;
        for leaf in composition.leaves(id)? {
            let right = composition.get(leaf)?.bounds().right();
            if right - handle <= x && x <= right {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
