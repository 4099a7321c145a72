//! Flattening ASTs back into lexeme sequences.

use crate::lexeme::{Interval, Lexeme};
use crate::tree::{dft, Ast};

// -------------------------------------------------------------------------------------------------

/// Depth-first flatten of all leaf lexemes in tree order.
///
/// A tree consisting purely of intervals (no absolute tones left) is turned back
/// into a contiguous tone sequence: each interval contributes its `from` and `to`
/// tones, where a `from` equal to the previous interval's `to` is emitted only once.
/// Intervals missing an endpoint cannot be reconstructed; such sequences are
/// returned as the raw interval lexemes.
pub fn flatten(ast: &Ast) -> Vec<Lexeme> {
    let mut flat = Vec::new();
    dft(ast, &mut |tree| {
        if let Ast::Leaf(leaf) = tree {
            flat.push(leaf.value.clone());
        }
    });

    let all_complete_intervals = !flat.is_empty()
        && flat.iter().all(|lexeme| {
            matches!(lexeme, Lexeme::Interval(interval)
                if interval.from.is_some() && interval.to.is_some())
        });
    if all_complete_intervals {
        let intervals: Vec<&Interval> = flat.iter().filter_map(Lexeme::as_interval).collect();
        tones_from_intervals(&intervals)
    } else {
        flat
    }
}

/// [`flatten`], with the whole output sequence reversed.
pub fn flatten_reversed(ast: &Ast) -> Vec<Lexeme> {
    let mut flat = flatten(ast);
    flat.reverse();
    flat
}

/// Merge a chain of intervals into a deduplicated monophonic tone sequence: the
/// format downstream playback and rendering collaborators expect.
fn tones_from_intervals(intervals: &[&Interval]) -> Vec<Lexeme> {
    let mut tones = Vec::with_capacity(intervals.len() + 1);
    for interval in intervals {
        let (Some(from), Some(to)) = (&interval.from, &interval.to) else {
            continue;
        };
        match tones.last() {
            // overlapping endpoints: the previous interval already emitted this tone
            Some(Lexeme::Tone(last)) if last.note == from.note => {
                tones.push(Lexeme::from(to.clone()));
            }
            _ => {
                tones.push(Lexeme::from(from.clone()));
                tones.push(Lexeme::from(to.clone()));
            }
        }
    }
    tones
}

// -------------------------------------------------------------------------------------------------
