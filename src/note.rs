//! MIDI note numbers and their derived pitch names.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

// -------------------------------------------------------------------------------------------------

/// A MIDI note number wrapped into a valid 7 bit range. The pitch name is always derived from
/// the number, so a tone can never carry a name that contradicts its note number.
///
/// Construction from raw `u8` values is fallible: values above 127 have no pitch.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Note(u8);

impl Note {
    /// Get the raw MIDI note number.
    pub fn number(&self) -> u8 {
        self.0
    }

    /// Get root key of the note as number: 0 = C, 1 = C# ...
    pub fn key(&self) -> u8 {
        self.0 % 12
    }

    /// Get the note's octave, using the C4 = 60 convention.
    pub fn octave(&self) -> i32 {
        self.0 as i32 / 12 - 1
    }

    /// Return a new transposed note with the given half-tone offset, clamped to the valid range.
    #[must_use]
    pub fn transposed(&self, offset: i32) -> Self {
        Note((self.0 as i32 + offset).clamp(0, 0x7f) as u8)
    }
}

impl TryFrom<u8> for Note {
    type Error = String;

    fn try_from(number: u8) -> Result<Self, String> {
        if number > 0x7f {
            Err(format!(
                "midi note number {} cannot be converted into a pitch",
                number
            ))
        } else {
            Ok(Note(number))
        }
    }
}

impl From<Note> for u8 {
    fn from(note: Note) -> u8 {
        note.0
    }
}

impl Display for Note {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const NOTE_NAMES: [&str; 12] = [
            "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
        ];
        write!(f, "{}{}", NOTE_NAMES[self.key() as usize], self.octave())
    }
}

// -------------------------------------------------------------------------------------------------
