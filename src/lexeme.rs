//! Symbolic music events as classified and re-synthesized by the grammar engine.

use std::fmt::Display;

use derive_more::From;
use serde::{Deserialize, Serialize};

use crate::note::Note;

// -------------------------------------------------------------------------------------------------

/// A played note with absolute timing.
///
/// `start` and `duration` are in milliseconds, `duration` is expected to be >= 0.
/// The optional fields are annotation side channels: upstream analysis stages may
/// attach a tempo-relative note value, the estimated tempo and a velocity-peak flag
/// before the sequence enters the lexer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tone {
    pub start: f64,
    pub duration: f64,
    pub note: Note,
    pub velocity: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bpm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peak: Option<bool>,
}

impl Tone {
    /// Create a new tone from a raw MIDI note number.
    /// Fails when the note number cannot be resolved to a pitch.
    pub fn new(start: f64, duration: f64, note_number: u8, velocity: u8) -> Result<Self, String> {
        let note = Note::try_from(note_number)?;
        Ok(Self {
            start,
            duration,
            note,
            velocity,
            note_value: None,
            bpm: None,
            peak: None,
        })
    }

    /// The derived pitch name, e.g. "C4" or "A#3".
    pub fn pitch(&self) -> String {
        self.note.to_string()
    }
}

impl Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.note)
    }
}

// -------------------------------------------------------------------------------------------------

/// A pause between played notes, in milliseconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rest {
    pub start: f64,
    pub duration: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note_value: Option<f64>,
}

impl Rest {
    pub fn new(start: f64, duration: f64) -> Self {
        Self {
            start,
            duration,
            note_value: None,
        }
    }
}

impl Display for Rest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rest")
    }
}

// -------------------------------------------------------------------------------------------------

/// A directed pitch distance between two tones, derived by the annotation stage.
///
/// The endpoints are optional: intervals used for pure analysis may carry the step
/// count only, while intervals that should serialize back into a tone sequence need
/// both `from` and `to`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub half_tone_steps: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Tone>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Tone>,
}

impl Interval {
    pub fn new(half_tone_steps: i32) -> Self {
        Self {
            half_tone_steps,
            from: None,
            to: None,
        }
    }

    pub fn with_endpoints(half_tone_steps: i32, from: Tone, to: Tone) -> Self {
        Self {
            half_tone_steps,
            from: Some(from),
            to: Some(to),
        }
    }

    /// Flip the interval's direction: endpoints swap and the step count negates.
    pub fn invert(&mut self) {
        std::mem::swap(&mut self.from, &mut self.to);
        self.half_tone_steps = -self.half_tone_steps;
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:+}", self.half_tone_steps)
    }
}

// -------------------------------------------------------------------------------------------------

/// A single symbolic event flowing through the pipeline.
///
/// The discriminant is serialized as a `type` tag, so the variant survives a trip
/// through JSON without any structural guessing on the way back in.
#[derive(Clone, Debug, PartialEq, From, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Lexeme {
    Tone(Tone),
    Rest(Rest),
    Interval(Interval),
}

impl Lexeme {
    pub fn is_tone(&self) -> bool {
        matches!(self, Lexeme::Tone(_))
    }

    pub fn is_rest(&self) -> bool {
        matches!(self, Lexeme::Rest(_))
    }

    pub fn is_interval(&self) -> bool {
        matches!(self, Lexeme::Interval(_))
    }

    pub fn as_tone(&self) -> Option<&Tone> {
        match self {
            Lexeme::Tone(tone) => Some(tone),
            _ => None,
        }
    }

    pub fn as_interval(&self) -> Option<&Interval> {
        match self {
            Lexeme::Interval(interval) => Some(interval),
            _ => None,
        }
    }

    /// Start time in ms. Intervals have no timing of their own.
    pub fn start(&self) -> Option<f64> {
        match self {
            Lexeme::Tone(tone) => Some(tone.start),
            Lexeme::Rest(rest) => Some(rest.start),
            Lexeme::Interval(_) => None,
        }
    }

    /// Duration in ms. Intervals have no timing of their own.
    pub fn duration(&self) -> Option<f64> {
        match self {
            Lexeme::Tone(tone) => Some(tone.duration),
            Lexeme::Rest(rest) => Some(rest.duration),
            Lexeme::Interval(_) => None,
        }
    }
}

impl Display for Lexeme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Lexeme::Tone(tone) => tone.fmt(f),
            Lexeme::Rest(rest) => rest.fmt(f),
            Lexeme::Interval(interval) => interval.fmt(f),
        }
    }
}

// -------------------------------------------------------------------------------------------------
