// In-memory host collaborators for headless use and tests
//
// Every handle is a cheap clone sharing its state, so a caller can keep one
// copy for inspection after boxing the other into the editor.

use crate::composition::{ObjectId, SoundObject};
use crate::host::traits::{Clipboard, PlaybackSink, RenderSurface, Viewport};
use crate::playback::NoteEvent;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Render surface that tracks which visuals are on screen
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    visible: Rc<RefCell<Vec<ObjectId>>>,
    attach_calls: Rc<Cell<usize>>,
    detach_calls: Rc<Cell<usize>>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Visuals currently on screen, in attach order
    pub fn visible(&self) -> Vec<ObjectId> {
        self.visible.borrow().clone()
    }

    pub fn is_visible(&self, id: ObjectId) -> bool {
        self.visible.borrow().contains(&id)
    }

    pub fn attach_calls(&self) -> usize {
        self.attach_calls.get()
    }

    pub fn detach_calls(&self) -> usize {
        self.detach_calls.get()
    }
}

impl RenderSurface for MemorySurface {
    fn attach(&mut self, object: &SoundObject) {
        self.attach_calls.set(self.attach_calls.get() + 1);
        let mut visible = self.visible.borrow_mut();
        if !visible.contains(&object.id()) {
            visible.push(object.id());
        }
    }

    fn detach(&mut self, object: &SoundObject) {
        self.detach_calls.set(self.detach_calls.get() + 1);
        self.visible.borrow_mut().retain(|&id| id != object.id());
    }
}

/// Clipboard backed by a shared string
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    text: Rc<RefCell<Option<String>>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current contents
    pub fn contents(&self) -> Option<String> {
        self.text.borrow().clone()
    }

    /// Replace the contents, as another application would
    pub fn put(&self, text: impl Into<String>) {
        *self.text.borrow_mut() = Some(text.into());
    }
}

impl Clipboard for MemoryClipboard {
    fn get_text(&self) -> Option<String> {
        self.contents()
    }

    fn set_text(&mut self, text: String) {
        self.put(text);
    }
}

/// Viewport whose scroll offset is set by hand
#[derive(Debug, Clone, Default)]
pub struct FixedViewport {
    offset: Rc<Cell<(i32, i32)>>,
}

impl FixedViewport {
    pub fn new(x: i32, y: i32) -> Self {
        Self {
            offset: Rc::new(Cell::new((x, y))),
        }
    }

    pub fn scroll_to(&self, x: i32, y: i32) {
        self.offset.set((x, y));
    }
}

impl Viewport for FixedViewport {
    fn current_scroll_offset(&self) -> (i32, i32) {
        self.offset.get()
    }
}

#[derive(Debug, Default)]
struct SinkState {
    events: Vec<NoteEvent>,
    playing_until: Option<i32>,
    stop_calls: usize,
}

/// Playback sink that records what it was asked to play
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    state: Rc<RefCell<SinkState>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scheduled events
    pub fn events(&self) -> Vec<NoteEvent> {
        self.state.borrow().events.clone()
    }

    pub fn is_playing(&self) -> bool {
        self.state.borrow().playing_until.is_some()
    }

    /// Tick at which the playhead stops while playing
    pub fn playhead_end(&self) -> Option<i32> {
        self.state.borrow().playing_until
    }

    /// Number of `stop` calls received so far
    pub fn stop_calls(&self) -> usize {
        self.state.borrow().stop_calls
    }
}

impl PlaybackSink for RecordingSink {
    fn clear(&mut self) {
        self.state.borrow_mut().events.clear();
    }

    fn add_event(&mut self, event: NoteEvent) {
        self.state.borrow_mut().events.push(event);
    }

    fn play(&mut self, end_tick: i32) {
        self.state.borrow_mut().playing_until = Some(end_tick);
    }

    fn stop(&mut self) {
        let mut state = self.state.borrow_mut();
        state.playing_until = None;
        state.stop_calls += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::{Composition, Instrument};

    #[test]
    fn test_surface_tracks_visuals() {
        let mut composition = Composition::default();
        let id = composition.create_note(0, 0, 100, Instrument::Piano);
        let object = composition.get(id).unwrap().clone();

        let surface = MemorySurface::new();
        let mut handle: Box<dyn RenderSurface> = Box::new(surface.clone());

        handle.attach(&object);
        handle.attach(&object);
        assert_eq!(surface.visible(), vec![id]);
        assert_eq!(surface.attach_calls(), 2);

        handle.detach(&object);
        assert!(!surface.is_visible(id));
        assert_eq!(surface.detach_calls(), 1);
    }

    #[test]
    fn test_clipboard_shares_contents() {
        let clipboard = MemoryClipboard::new();
        let mut handle: Box<dyn Clipboard> = Box::new(clipboard.clone());
        assert_eq!(handle.get_text(), None);

        handle.set_text("hello".to_string());
        assert_eq!(clipboard.contents().as_deref(), Some("hello"));

        clipboard.put("other");
        assert_eq!(handle.get_text().as_deref(), Some("other"));
    }

    #[test]
    fn test_viewport_scroll() {
        let viewport = FixedViewport::new(5, 5);
        let handle: Box<dyn Viewport> = Box::new(viewport.clone());
        viewport.scroll_to(40, 0);
        assert_eq!(handle.current_scroll_offset(), (40, 0));
    }

    #[test]
    fn test_sink_play_and_stop() {
        let sink = RecordingSink::new();
        let mut handle: Box<dyn PlaybackSink> = Box::new(sink.clone());

        handle.play(300);
        assert_eq!(sink.playhead_end(), Some(300));

        handle.stop();
        handle.stop();
        assert!(!sink.is_playing());
        assert_eq!(sink.stop_calls(), 2);
    }
}
