//! Probabilistic dropping and doubling of subtrees.

use std::collections::HashMap;

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::transform::AstTransform;
use crate::tree::{Ast, TreeNode};

// -------------------------------------------------------------------------------------------------

/// Weight factor for the true outcome in `[0, inf]`: 0 never fires, 1 is a fair
/// coin, larger weights fire ever more likely.
fn weighted_coin(rand_gen: &mut Xoshiro256PlusPlus, weight: f64) -> bool {
    (rand_gen.random_range(0.0..1.0) * weight).round() >= 1.0
}

/// Per-label weights. A child whose label is not selected never flips a coin;
/// `None` selects every child with a fair coin.
pub type WeightedSelectors = Option<HashMap<String, f64>>;

fn child_weight(selectors: &WeightedSelectors, label: &str) -> Option<f64> {
    match selectors {
        None => Some(1.0),
        Some(weights) => weights.get(label).copied(),
    }
}

// -------------------------------------------------------------------------------------------------

/// Independently drop direct children of the root node.
#[derive(Clone, Debug)]
pub struct DropChildren {
    selectors: WeightedSelectors,
    rand_gen: Xoshiro256PlusPlus,
    seed: Option<u64>,
}

impl DropChildren {
    pub fn new(selectors: WeightedSelectors, seed: Option<u64>) -> Self {
        let rand_seed = seed.unwrap_or_else(|| rand::rng().random());
        Self {
            selectors,
            rand_gen: Xoshiro256PlusPlus::seed_from_u64(rand_seed),
            seed,
        }
    }
}

impl AstTransform for DropChildren {
    fn apply(&mut self, ast: &mut Ast) {
        let Ast::Node(node) = ast else {
            return;
        };
        let rand_gen = &mut self.rand_gen;
        let selectors = &self.selectors;
        node.children
            .retain(|child| match child_weight(selectors, child.label()) {
                Some(weight) => !weighted_coin(rand_gen, weight),
                None => true,
            });
    }

    fn reset(&mut self) {
        if let Some(seed) = self.seed {
            self.rand_gen = Xoshiro256PlusPlus::seed_from_u64(seed);
        }
    }
}

// -------------------------------------------------------------------------------------------------

/// Independently duplicate direct children of the root node: the deep copy is
/// appended right after the original.
#[derive(Clone, Debug)]
pub struct DoubleChildren {
    selectors: WeightedSelectors,
    rand_gen: Xoshiro256PlusPlus,
    seed: Option<u64>,
}

impl DoubleChildren {
    pub fn new(selectors: WeightedSelectors, seed: Option<u64>) -> Self {
        let rand_seed = seed.unwrap_or_else(|| rand::rng().random());
        Self {
            selectors,
            rand_gen: Xoshiro256PlusPlus::seed_from_u64(rand_seed),
            seed,
        }
    }
}

impl AstTransform for DoubleChildren {
    fn apply(&mut self, ast: &mut Ast) {
        let Ast::Node(node) = ast else {
            return;
        };
        let mut new_children = Vec::with_capacity(node.children.len());
        for child in node.children.drain(..) {
            let double = match child_weight(&self.selectors, child.label()) {
                Some(weight) => weighted_coin(&mut self.rand_gen, weight),
                None => false,
            };
            if double {
                let copy = child.clone();
                new_children.push(child);
                new_children.push(copy);
            } else {
                new_children.push(child);
            }
        }
        node.children = new_children;
    }

    fn reset(&mut self) {
        if let Some(seed) = self.seed {
            self.rand_gen = Xoshiro256PlusPlus::seed_from_u64(seed);
        }
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use super::{DoubleChildren, DropChildren};
    use crate::lexeme::{Lexeme, Tone};
    use crate::transform::AstTransform;
    use crate::tree::{Ast, TreeNode};

    fn ast_with_children(labels: &[&str]) -> Ast {
        let children = labels
            .iter()
            .map(|label| {
                Ast::leaf(
                    *label,
                    Lexeme::from(Tone::new(0.0, 100.0, 60, 90).unwrap()),
                )
            })
            .collect();
        Ast::node("S", None, children)
    }

    fn child_count(ast: &Ast) -> usize {
        ast.children().len()
    }

    #[test]
    fn zero_weight_never_drops() {
        let selectors = Some(HashMap::from([("x".to_string(), 0.0)]));
        let mut drop = DropChildren::new(selectors, Some(1));
        let mut ast = ast_with_children(&["x", "x", "x", "x"]);
        drop.apply(&mut ast);
        assert_eq!(child_count(&ast), 4);
    }

    #[test]
    fn huge_weight_drops_everything_selected() {
        let selectors = Some(HashMap::from([("x".to_string(), 1e9)]));
        let mut drop = DropChildren::new(selectors, Some(1));
        let mut ast = ast_with_children(&["x", "keep", "x", "keep"]);
        drop.apply(&mut ast);
        let labels: Vec<&str> = ast.children().iter().map(|c| c.label()).collect();
        assert_eq!(labels, vec!["keep", "keep"]);
    }

    #[test]
    fn unselected_labels_are_untouched() {
        let selectors = Some(HashMap::from([("other".to_string(), 1e9)]));
        let mut drop = DropChildren::new(selectors, Some(1));
        let mut ast = ast_with_children(&["x", "x"]);
        drop.apply(&mut ast);
        assert_eq!(child_count(&ast), 2);
    }

    #[test]
    fn doubling_appends_copies_in_place() {
        let selectors = Some(HashMap::from([("x".to_string(), 1e9)]));
        let mut double = DoubleChildren::new(selectors, Some(1));
        let mut ast = ast_with_children(&["x", "y"]);
        double.apply(&mut ast);
        let labels: Vec<&str> = ast.children().iter().map(|c| c.label()).collect();
        assert_eq!(labels, vec!["x", "x", "y"]);
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let mut left = ast_with_children(&["x"; 16]);
        let mut right = left.clone();
        DropChildren::new(None, Some(13)).apply(&mut left);
        DropChildren::new(None, Some(13)).apply(&mut right);
        assert_eq!(left, right);
    }
}
