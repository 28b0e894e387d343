// Host collaborator traits - Services the editor core talks to

use crate::composition::SoundObject;
use crate::playback::NoteEvent;

/// Canvas that draws one visual per sound object
///
/// A gesture's frame is a visual of its own, separate from its children's.
pub trait RenderSurface {
    /// Make the object's visual appear
    fn attach(&mut self, object: &SoundObject);

    /// Remove the object's visual
    fn detach(&mut self, object: &SoundObject);
}

/// System clipboard holding plain text
pub trait Clipboard {
    fn get_text(&self) -> Option<String>;

    fn set_text(&mut self, text: String);
}

/// Scrollable view over the pane
pub trait Viewport {
    /// Horizontal and vertical scroll offset in pane units
    fn current_scroll_offset(&self) -> (i32, i32);
}

/// Consumer of note events
pub trait PlaybackSink {
    /// Drop every scheduled event
    fn clear(&mut self);

    fn add_event(&mut self, event: NoteEvent);

    /// Start playing from tick 0; the playhead stops at `end_tick`
    fn play(&mut self, end_tick: i32);

    /// Stop playing; harmless when already stopped
    fn stop(&mut self);
}
