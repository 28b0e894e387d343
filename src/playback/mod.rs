// Playback extraction - Note events handed to the playback sink
//
// The composition does not play anything itself. It is flattened into
// events carrying MIDI pitch, program and channel, and the sink schedules them.

use crate::composition::{Composition, ObjectId};
use serde::{Deserialize, Serialize};

/// One note to be played, in ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteEvent {
    pub start_tick: i32,
    pub duration: i32,
    /// MIDI note number (0-127)
    pub pitch: u8,
    /// General MIDI program
    pub program: u8,
    /// MIDI channel (0-15)
    pub channel: u8,
}

impl NoteEvent {
    /// Tick at which the note stops
    pub fn end_tick(&self) -> i32 {
        self.start_tick + self.duration
    }
}

/// Build the event for a single note, `None` for gestures and unknown ids
pub fn note_event(composition: &Composition, id: ObjectId) -> Option<NoteEvent> {
    let object = composition.get(id).ok()?;
    let instrument = object.instrument()?;
    Some(NoteEvent {
        start_tick: object.start_tick(),
        duration: object.duration(),
        pitch: object.pitch(composition.grid())?,
        program: instrument.program(),
        channel: instrument.channel(),
    })
}

/// Events for every attached note, sorted by start tick
pub fn collect_events(composition: &Composition) -> Vec<NoteEvent> {
    let mut events: Vec<NoteEvent> = composition
        .notes()
        .into_iter()
        .filter_map(|id| note_event(composition, id))
        .collect();
    events.sort_by_key(|event| event.start_tick);
    events
}
