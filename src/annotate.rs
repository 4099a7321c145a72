//! Annotation stages run between capture and lexing: deriving intervals from tone
//! pairs, marking velocity peaks and attaching tempo-relative note values.
//!
//! Tempo and pitch estimation itself happens upstream - these helpers only work
//! with what the lexemes already carry.

use std::fmt::Display;

use crate::lexeme::{Interval, Lexeme};

// -------------------------------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnnotateError {
    /// Interval derivation needs at least two lexemes.
    TooFewLexemes { got: usize },
}

impl Display for AnnotateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnnotateError::TooFewLexemes { got } => {
                write!(f, "lexemes must at least have length 2, got {}", got)
            }
        }
    }
}

impl std::error::Error for AnnotateError {}

// -------------------------------------------------------------------------------------------------

/// Replace the sequence with the intervals between each pair of consecutive tones.
/// Rests break the chain: no interval spans across them.
pub fn derive_intervals(lexemes: &[Lexeme]) -> Result<Vec<Lexeme>, AnnotateError> {
    if lexemes.len() < 2 {
        return Err(AnnotateError::TooFewLexemes { got: lexemes.len() });
    }

    let mut intervals = Vec::new();
    for pair in lexemes.windows(2) {
        if let (Lexeme::Tone(left), Lexeme::Tone(right)) = (&pair[0], &pair[1]) {
            let steps = right.note.number() as i32 - left.note.number() as i32;
            intervals.push(Lexeme::from(Interval::with_endpoints(
                steps,
                left.clone(),
                right.clone(),
            )));
        }
    }
    Ok(intervals)
}

/// Keep the original events and weave the derived intervals in between them.
pub fn interleave_intervals(lexemes: &[Lexeme]) -> Result<Vec<Lexeme>, AnnotateError> {
    if lexemes.len() < 2 {
        return Err(AnnotateError::TooFewLexemes { got: lexemes.len() });
    }

    let mut interleaved = vec![lexemes[0].clone()];
    for pair in lexemes.windows(2) {
        if let (Lexeme::Tone(left), Lexeme::Tone(right)) = (&pair[0], &pair[1]) {
            let steps = right.note.number() as i32 - left.note.number() as i32;
            interleaved.push(Lexeme::from(Interval::new(steps)));
        }
        interleaved.push(pair[1].clone());
    }
    Ok(interleaved)
}

/// Flag tones that are local velocity maxima among tone neighbors. The sequence
/// edges count as peaks when they are louder than their single neighbor.
pub fn mark_peaks(mut lexemes: Vec<Lexeme>) -> Vec<Lexeme> {
    let velocities: Vec<Option<u8>> = lexemes
        .iter()
        .map(|l| l.as_tone().map(|t| t.velocity))
        .collect();

    let louder = |left: Option<u8>, right: Option<u8>| match (left, right) {
        (Some(left), Some(right)) => left > right,
        _ => false,
    };

    let last = velocities.len().saturating_sub(1);
    for (index, lexeme) in lexemes.iter_mut().enumerate() {
        let Lexeme::Tone(tone) = lexeme else { continue };
        let here = velocities[index];
        let peak = if velocities.len() < 3 {
            false
        } else if index == 0 {
            louder(here, velocities[1])
        } else if index == last {
            louder(here, velocities[last - 1])
        } else {
            louder(here, velocities[index - 1]) && louder(here, velocities[index + 1])
        };
        tone.peak = Some(peak);
    }
    lexemes
}

/// Attach tempo-relative note values at the given bpm and drop rests shorter than
/// one beat. Note values are quantized to the coarse grid the rhythm rule sets
/// classify against.
pub fn annotate_note_values(lexemes: Vec<Lexeme>, bpm: f64) -> Vec<Lexeme> {
    const GRID: [f64; 7] = [0.25, 1.0 / 3.0, 0.5, 1.0, 2.0, 3.0, 4.0];

    let beat_period_ms = 60000.0 / bpm;
    let quantize = |duration: f64| {
        let raw = duration / beat_period_ms;
        let mut nearest = GRID[0];
        for candidate in GRID {
            if (raw - candidate).abs() < (raw - nearest).abs() {
                nearest = candidate;
            }
        }
        nearest
    };

    lexemes
        .into_iter()
        .filter_map(|lexeme| match lexeme {
            Lexeme::Tone(mut tone) => {
                tone.note_value = Some(quantize(tone.duration));
                tone.bpm = Some(bpm);
                Some(Lexeme::Tone(tone))
            }
            Lexeme::Rest(mut rest) => {
                let note_value = quantize(rest.duration);
                if note_value < 1.0 {
                    None
                } else {
                    rest.note_value = Some(note_value);
                    Some(Lexeme::Rest(rest))
                }
            }
            other => Some(other),
        })
        .collect()
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::{
        annotate_note_values, derive_intervals, interleave_intervals, mark_peaks, AnnotateError,
    };
    use crate::lexeme::{Lexeme, Rest, Tone};

    fn tone(note_number: u8, velocity: u8) -> Lexeme {
        Lexeme::from(Tone::new(0.0, 500.0, note_number, velocity).unwrap())
    }

    #[test]
    fn intervals_between_consecutive_tones() {
        let lexemes = vec![tone(60, 90), tone(64, 90), tone(62, 90)];
        let intervals = derive_intervals(&lexemes).unwrap();
        let steps: Vec<i32> = intervals
            .iter()
            .filter_map(|l| l.as_interval().map(|i| i.half_tone_steps))
            .collect();
        assert_eq!(steps, vec![4, -2]);
    }

    #[test]
    fn rests_break_the_interval_chain() {
        let lexemes = vec![tone(60, 90), Lexeme::from(Rest::new(0.0, 500.0)), tone(64, 90)];
        let intervals = derive_intervals(&lexemes).unwrap();
        assert!(intervals.is_empty());
    }

    #[test]
    fn too_short_input_is_an_error() {
        assert_eq!(
            derive_intervals(&[tone(60, 90)]),
            Err(AnnotateError::TooFewLexemes { got: 1 })
        );
    }

    #[test]
    fn interleaving_keeps_originals() {
        let lexemes = vec![tone(60, 90), tone(64, 90)];
        let interleaved = interleave_intervals(&lexemes).unwrap();
        assert_eq!(interleaved.len(), 3);
        assert!(interleaved[0].is_tone());
        assert!(interleaved[1].is_interval());
        assert!(interleaved[2].is_tone());
    }

    #[test]
    fn peaks_are_local_velocity_maxima() {
        let lexemes = vec![tone(60, 50), tone(62, 100), tone(64, 50), tone(65, 80)];
        let peaks: Vec<Option<bool>> = mark_peaks(lexemes)
            .iter()
            .map(|l| l.as_tone().and_then(|t| t.peak))
            .collect();
        assert_eq!(
            peaks,
            vec![Some(false), Some(true), Some(false), Some(true)]
        );
    }

    #[test]
    fn note_values_quantize_and_short_rests_vanish() {
        // 120 bpm: one beat is 500ms
        let lexemes = vec![
            tone(60, 90),
            Lexeme::from(Rest::new(0.0, 100.0)),
            Lexeme::from(Rest::new(0.0, 1000.0)),
        ];
        let annotated = annotate_note_values(lexemes, 120.0);
        assert_eq!(annotated.len(), 2);
        assert_eq!(annotated[0].as_tone().and_then(|t| t.note_value), Some(1.0));
        assert_eq!(annotated[0].as_tone().and_then(|t| t.bpm), Some(120.0));
        match &annotated[1] {
            Lexeme::Rest(rest) => assert_eq!(rest.note_value, Some(2.0)),
            other => panic!("expected the long rest, got {:?}", other),
        }
    }
}
