//! Straight/swing rhythmic conversion on binary rhythm-pair nodes.

use crate::lexeme::Lexeme;
use crate::transform::AstTransform;
use crate::tree::{dft_mut, Ast, AstNode};

// -------------------------------------------------------------------------------------------------

const STRAIGHT_LABEL: &str = "STRAIGHT";
const SWING_LABEL: &str = "SWING";

fn bpm_to_period_ms(bpm: f64) -> f64 {
    60000.0 / bpm
}

/// Rewrite straight pairs into swing pairs or back. Operates on binary nodes labeled
/// `STRAIGHT`/`SWING` whose children are tone leaves annotated with a note value and
/// a tempo; nodes missing these annotations are skipped with a warning.
///
/// Straight to swing splits two even beats 2:1 at the same overall length; the
/// inverse restores two one-beat notes.
#[derive(Clone, Debug)]
pub struct SwingConversion {
    to_swing: bool,
}

impl SwingConversion {
    pub fn straight_to_swing() -> Self {
        Self { to_swing: true }
    }

    pub fn swing_to_straight() -> Self {
        Self { to_swing: false }
    }

    fn convert(&self, node: &mut AstNode) {
        let [Ast::Leaf(left), Ast::Leaf(right)] = node.children.as_mut_slice() else {
            log::warn!(
                "skipping '{}' node without exactly two leaf children",
                node.label
            );
            return;
        };
        let (Lexeme::Tone(left_tone), Lexeme::Tone(right_tone)) =
            (&mut left.value, &mut right.value)
        else {
            log::warn!("skipping '{}' node with non-tone children", node.label);
            return;
        };
        let (Some(note_value), Some(bpm)) = (left_tone.note_value, left_tone.bpm) else {
            log::warn!(
                "skipping '{}' node without note value and tempo annotations",
                node.label
            );
            return;
        };

        if self.to_swing {
            // stretch the pair onto a triplet grid: first note twice as long as the second
            let beat_period_ms = note_value * (bpm_to_period_ms(bpm) * 2.0) / 3.0;
            left_tone.note_value = Some(2.0);
            left_tone.duration = beat_period_ms * 2.0;
            right_tone.note_value = Some(1.0);
            right_tone.duration = beat_period_ms;
            left.label = "2".to_string();
            right.label = "1".to_string();
            node.label = SWING_LABEL.to_string();
        } else {
            // back onto the even grid: two notes of one beat each
            let beat_period_ms = bpm_to_period_ms(bpm);
            left_tone.note_value = Some(1.0);
            left_tone.duration = beat_period_ms;
            right_tone.note_value = Some(1.0);
            right_tone.duration = beat_period_ms;
            left.label = "1".to_string();
            right.label = "1".to_string();
            node.label = STRAIGHT_LABEL.to_string();
        }
    }
}

impl AstTransform for SwingConversion {
    fn apply(&mut self, ast: &mut Ast) {
        let source_label = if self.to_swing {
            STRAIGHT_LABEL
        } else {
            SWING_LABEL
        };
        dft_mut(ast, &mut |tree| {
            if let Ast::Node(node) = tree {
                if node.label == source_label {
                    self.convert(node);
                }
            }
        });
    }
}

// -------------------------------------------------------------------------------------------------
