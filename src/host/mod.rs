// Host collaborators - Rendering, clipboard, viewport and playback services
//
// The editor core never draws, scrolls or plays anything itself. It reaches
// those services through the traits below, which the embedding application
// implements. The in-memory versions serve tests and headless hosts; they are
// single-threaded (`Rc`-based).

pub mod memory;
pub mod traits;

pub use memory::{FixedViewport, MemoryClipboard, MemorySurface, RecordingSink};
pub use traits::{Clipboard, PlaybackSink, RenderSurface, Viewport};
