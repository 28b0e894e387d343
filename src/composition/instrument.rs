// Instrument table - General MIDI program and output channel per instrument

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Instruments a note can be played with
///
/// Every instrument owns a dedicated MIDI channel so notes of different
/// instruments can sound at the same time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Instrument {
    #[default]
    Piano,
    Harpsichord,
    Marimba,
    Organ,
    Accordion,
    Guitar,
    Violin,
    FrenchHorn,
}

impl Instrument {
    /// All instruments, in menu order
    pub const ALL: [Instrument; 8] = [
        Instrument::Piano,
        Instrument::Harpsichord,
        Instrument::Marimba,
        Instrument::Organ,
        Instrument::Accordion,
        Instrument::Guitar,
        Instrument::Violin,
        Instrument::FrenchHorn,
    ];

    /// General MIDI program number (0-based)
    pub fn program(&self) -> u8 {
        match self {
            Instrument::Piano => 0,
            Instrument::Harpsichord => 7,
            Instrument::Marimba => 13,
            Instrument::Organ => 17,
            Instrument::Accordion => 22,
            Instrument::Guitar => 25,
            Instrument::Violin => 41,
            Instrument::FrenchHorn => 61,
        }
    }

    /// MIDI channel (0-15) reserved for this instrument
    pub fn channel(&self) -> u8 {
        match self {
            Instrument::Piano => 0,
            Instrument::Harpsichord => 1,
            Instrument::Marimba => 2,
            Instrument::Organ => 3,
            Instrument::Accordion => 4,
            Instrument::Guitar => 5,
            Instrument::Violin => 6,
            Instrument::FrenchHorn => 7,
        }
    }

    /// Display name, also accepted by [`FromStr`]
    pub fn name(&self) -> &'static str {
        match self {
            Instrument::Piano => "Piano",
            Instrument::Harpsichord => "Harpsichord",
            Instrument::Marimba => "Marimba",
            Instrument::Organ => "Organ",
            Instrument::Accordion => "Accordion",
            Instrument::Guitar => "Guitar",
            Instrument::Violin => "Violin",
            Instrument::FrenchHorn => "FrenchHorn",
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Error returned when an instrument name is not in the table
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown instrument: {0}")]
pub struct UnknownInstrument(pub String);

impl FromStr for Instrument {
    type Err = UnknownInstrument;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Instrument::ALL
            .iter()
            .copied()
            .find(|instrument| instrument.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownInstrument(s.to_string()))
    }
}
