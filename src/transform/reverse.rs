//! Child-order reversal, at the root or on every node.

use crate::transform::AstTransform;
use crate::tree::{dft_mut, Ast};

// -------------------------------------------------------------------------------------------------

/// Reverse a node's children. The recursive variant reverses every node in the tree,
/// which reverses the flattened leaf sequence as well.
#[derive(Clone, Debug)]
pub struct Reverse {
    recursive: bool,
}

impl Reverse {
    pub fn root() -> Self {
        Self { recursive: false }
    }

    pub fn recursive() -> Self {
        Self { recursive: true }
    }
}

impl AstTransform for Reverse {
    fn apply(&mut self, ast: &mut Ast) {
        if self.recursive {
            dft_mut(ast, &mut |tree| {
                if let Ast::Node(node) = tree {
                    node.children.reverse();
                }
            });
        } else if let Ast::Node(node) = ast {
            node.children.reverse();
        }
    }
}

// -------------------------------------------------------------------------------------------------
