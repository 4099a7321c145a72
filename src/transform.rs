//! Named AST rewrites and serialization back into lexeme sequences.

use std::fmt::Debug;

use crate::lexeme::Lexeme;
use crate::tree::Ast;

// -------------------------------------------------------------------------------------------------

pub mod arrange;
pub mod intervallic;
pub mod reverse;
pub mod serialize;
pub mod shuffle;
pub mod swing;

// -------------------------------------------------------------------------------------------------

/// A tree-to-tree rewrite applied before serialization. Transforms mutate the tree
/// in place; the [`Pipeline`] hands them a deep copy, never the original parse.
pub trait AstTransform: Debug {
    /// Rewrite the tree in place.
    fn apply(&mut self, ast: &mut Ast);

    /// Rewind any internal random generator to its initial state, when seeded.
    fn reset(&mut self) {}
}

/// Pass the AST through unchanged.
#[derive(Clone, Debug, Default)]
pub struct Identity;

impl AstTransform for Identity {
    fn apply(&mut self, _ast: &mut Ast) {
        // nothing to do
    }
}

// -------------------------------------------------------------------------------------------------

/// AST to lexeme-sequence serialization step.
pub type SerializeFn = fn(&Ast) -> Vec<Lexeme>;

/// A configured transform/serialize pair, selected by name from external
/// configuration. The pipeline owns no tree: every [`Pipeline::run`] deep-copies
/// its input so the untransformed parse stays available for display and audit.
#[derive(Debug)]
pub struct Pipeline {
    tree: Box<dyn AstTransform>,
    serialize: SerializeFn,
}

impl Pipeline {
    pub fn new(tree: Box<dyn AstTransform>, serialize: SerializeFn) -> Self {
        Self { tree, serialize }
    }

    /// Look up a named transform/serialize pair. `seed` feeds the probabilistic
    /// transforms; deterministic ones ignore it.
    pub fn by_name(name: &str, seed: Option<u64>) -> Option<Pipeline> {
        use self::intervallic::{LabelMatch, NodeOp};

        let scale_match = |op: NodeOp| {
            Box::new(LabelMatch::new(vec![
                ("SCALEU".to_string(), op),
                ("SCALED".to_string(), op),
            ]))
        };

        let pipeline = match name {
            "default" => Pipeline::new(Box::new(Identity), serialize::flatten),
            "reverse" => Pipeline::new(Box::new(Identity), serialize::flatten_reversed),
            "reverse-root" => Pipeline::new(Box::new(reverse::Reverse::root()), serialize::flatten),
            "reverse-rec" => {
                Pipeline::new(Box::new(reverse::Reverse::recursive()), serialize::flatten)
            }
            "shuffle" => Pipeline::new(
                Box::new(shuffle::Shuffle::root(seed)),
                serialize::flatten,
            ),
            "shuffle-rec" => Pipeline::new(
                Box::new(shuffle::Shuffle::recursive(seed)),
                serialize::flatten,
            ),
            "drop" => Pipeline::new(
                Box::new(arrange::DropChildren::new(None, seed)),
                serialize::flatten,
            ),
            "double" => Pipeline::new(
                Box::new(arrange::DoubleChildren::new(None, seed)),
                serialize::flatten,
            ),
            "straight-to-swing" => Pipeline::new(
                Box::new(swing::SwingConversion::straight_to_swing()),
                serialize::flatten,
            ),
            "swing-to-straight" => Pipeline::new(
                Box::new(swing::SwingConversion::swing_to_straight()),
                serialize::flatten,
            ),
            "scale-mirror" => Pipeline::new(scale_match(intervallic::mirror), serialize::flatten),
            "scale-cancer" => Pipeline::new(scale_match(intervallic::cancer), serialize::flatten),
            "scale-mirror-cancer" => {
                Pipeline::new(scale_match(intervallic::mirror_cancer), serialize::flatten)
            }
            "scale-mirror-double" => {
                Pipeline::new(scale_match(intervallic::mirror_double), serialize::flatten)
            }
            "scale-cancer-double" => {
                Pipeline::new(scale_match(intervallic::cancer_double), serialize::flatten)
            }
            "scale-mirror-cancer-double" => Pipeline::new(
                scale_match(intervallic::mirror_cancer_double),
                serialize::flatten,
            ),
            _ => return None,
        };
        Some(pipeline)
    }

    /// Apply the tree rewrite to a deep copy of the input.
    pub fn transform(&mut self, ast: &Ast) -> Ast {
        let mut copy = ast.clone();
        self.tree.apply(&mut copy);
        copy
    }

    /// Serialize a (transformed) tree into the output lexeme sequence.
    pub fn serialize(&self, ast: &Ast) -> Vec<Lexeme> {
        (self.serialize)(ast)
    }

    /// Transform a deep copy of the input and serialize it: returns the transformed
    /// tree (for visualization) together with the output sequence.
    pub fn run(&mut self, ast: &Ast) -> (Ast, Vec<Lexeme>) {
        let transformed = self.transform(ast);
        let output = self.serialize(&transformed);
        (transformed, output)
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::Pipeline;
    use crate::lexeme::{Lexeme, Rest, Tone};
    use crate::tree::Ast;

    fn tone_leaf(name: &str, note_number: u8) -> Ast {
        Ast::leaf(
            name,
            Lexeme::from(Tone::new(0.0, 100.0, note_number, 90).unwrap()),
        )
    }

    fn simple_ast() -> Ast {
        Ast::node(
            "S",
            None,
            vec![
                tone_leaf("tone", 60),
                Ast::leaf("rest", Lexeme::from(Rest::new(100.0, 100.0))),
                tone_leaf("tone", 64),
            ],
        )
    }

    #[test]
    fn unknown_pipeline_name() {
        assert!(Pipeline::by_name("no-such-transform", None).is_none());
    }

    #[test]
    fn identity_round_trips_leaf_values() {
        let ast = simple_ast();
        let mut pipeline = Pipeline::by_name("default", None).unwrap();
        let (transformed, output) = pipeline.run(&ast);
        assert_eq!(transformed, ast);

        let notes: Vec<Option<u8>> = output
            .iter()
            .map(|l| l.as_tone().map(|t| t.note.number()))
            .collect();
        assert_eq!(notes, vec![Some(60), None, Some(64)]);
    }

    #[test]
    fn reverse_reverses_the_flattened_output() {
        let ast = simple_ast();
        let mut pipeline = Pipeline::by_name("reverse", None).unwrap();
        let (transformed, output) = pipeline.run(&ast);
        // tree untouched, only the serialization order flips
        assert_eq!(transformed, ast);
        let notes: Vec<Option<u8>> = output
            .iter()
            .map(|l| l.as_tone().map(|t| t.note.number()))
            .collect();
        assert_eq!(notes, vec![Some(64), None, Some(60)]);
    }

    #[test]
    fn transforms_never_touch_the_input_tree() {
        let ast = simple_ast();
        let mut pipeline = Pipeline::by_name("reverse-root", None).unwrap();
        let (transformed, _) = pipeline.run(&ast);
        assert_ne!(transformed, ast);
        assert_eq!(ast, simple_ast());
    }
}
