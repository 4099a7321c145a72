//! Probabilistic child-order shuffling.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::transform::AstTransform;
use crate::tree::{dft_mut, Ast};

// -------------------------------------------------------------------------------------------------

/// Fisher-Yates shuffle of a node's children, at the root or on every node.
///
/// Two-child nodes are always swapped instead of shuffled: a plain shuffle leaves
/// them in place half of the time, which audibly under-transforms short motives.
#[derive(Clone, Debug)]
pub struct Shuffle {
    recursive: bool,
    rand_gen: Xoshiro256PlusPlus,
    seed: Option<u64>,
}

impl Shuffle {
    pub fn root(seed: Option<u64>) -> Self {
        Self::new(false, seed)
    }

    pub fn recursive(seed: Option<u64>) -> Self {
        Self::new(true, seed)
    }

    fn new(recursive: bool, seed: Option<u64>) -> Self {
        let rand_seed = seed.unwrap_or_else(|| rand::rng().random());
        Self {
            recursive,
            rand_gen: Xoshiro256PlusPlus::seed_from_u64(rand_seed),
            seed,
        }
    }
}

fn shuffle_children(children: &mut [Ast], rand_gen: &mut Xoshiro256PlusPlus) {
    match children.len() {
        0 | 1 => {}
        2 => children.swap(0, 1),
        _ => children.shuffle(rand_gen),
    }
}

impl AstTransform for Shuffle {
    fn apply(&mut self, ast: &mut Ast) {
        let rand_gen = &mut self.rand_gen;
        if self.recursive {
            dft_mut(ast, &mut |tree| {
                if let Ast::Node(node) = tree {
                    shuffle_children(&mut node.children, rand_gen);
                }
            });
        } else if let Ast::Node(node) = ast {
            shuffle_children(&mut node.children, rand_gen);
        }
    }

    fn reset(&mut self) {
        if let Some(seed) = self.seed {
            self.rand_gen = Xoshiro256PlusPlus::seed_from_u64(seed);
        }
    }
}

// -------------------------------------------------------------------------------------------------
