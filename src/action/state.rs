// EditorState - Everything an action may touch
//
// The composition is the single source of truth. The host collaborators are
// notified as a side effect so the screen, clipboard and player follow it.

use crate::composition::{Composition, CompositionResult, ObjectId};
use crate::config::EditorConfig;
use crate::host::{
    Clipboard, FixedViewport, MemoryClipboard, MemorySurface, PlaybackSink, RecordingSink,
    RenderSurface, Viewport,
};

/// Mutable state handed to actions
pub struct EditorState {
    /// Sound object tree
    pub composition: Composition,

    pub surface: Box<dyn RenderSurface>,

    pub clipboard: Box<dyn Clipboard>,

    pub viewport: Box<dyn Viewport>,

    pub playback: Box<dyn PlaybackSink>,
}

impl EditorState {
    pub fn new(
        composition: Composition,
        surface: Box<dyn RenderSurface>,
        clipboard: Box<dyn Clipboard>,
        viewport: Box<dyn Viewport>,
        playback: Box<dyn PlaybackSink>,
    ) -> Self {
        Self {
            composition,
            surface,
            clipboard,
            viewport,
            playback,
        }
    }

    /// State backed by fresh in-memory collaborators
    pub fn headless(config: &EditorConfig) -> Self {
        Self::new(
            Composition::with_config(config),
            Box::new(MemorySurface::new()),
            Box::new(MemoryClipboard::new()),
            Box::new(FixedViewport::default()),
            Box::new(RecordingSink::new()),
        )
    }

    /// Attach the visual of a single object (a gesture frame, for instance)
    pub fn show(&mut self, id: ObjectId) -> CompositionResult<()> {
        let object = self.composition.get(id)?;
        self.surface.attach(object);
        Ok(())
    }

    /// Detach the visual of a single object
    pub fn hide(&mut self, id: ObjectId) -> CompositionResult<()> {
        let object = self.composition.get(id)?;
        self.surface.detach(object);
        Ok(())
    }

    /// Attach the visuals of an object and everything it contains
    pub fn show_subtree(&mut self, id: ObjectId) -> CompositionResult<()> {
        for object in self.composition.subtree(id)? {
            self.show(object)?;
        }
        Ok(())
    }

    /// Detach the visuals of an object and everything it contains
    pub fn hide_subtree(&mut self, id: ObjectId) -> CompositionResult<()> {
        for object in self.composition.subtree(id)? {
            self.hide(object)?;
        }
        Ok(())
    }
}
