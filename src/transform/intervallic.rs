//! Interval-sequence rewrites: retrograde ("cancer"), mirror inversion and their
//! doubling combinators, applied to matched node labels.

use crate::lexeme::Lexeme;
use crate::transform::AstTransform;
use crate::tree::{dft_mut, Ast, AstNode};

// -------------------------------------------------------------------------------------------------

/// A node-level rewrite applied wherever a label rule matches.
pub type NodeOp = fn(&mut AstNode);

/// True for nodes that expand into interval leaves only - the node class all
/// intervallic rewrites operate on. Other nodes pass through untouched.
fn is_terminal_interval_node(node: &AstNode) -> bool {
    !node.children.is_empty()
        && node.children.iter().all(|child| {
            matches!(child, Ast::Leaf(leaf) if leaf.value.is_interval())
        })
}

// -------------------------------------------------------------------------------------------------

/// Musical retrograde: reverse the interval order and flip every interval's
/// direction. Applying it twice restores the original node.
pub fn cancer(node: &mut AstNode) {
    if !is_terminal_interval_node(node) {
        return;
    }
    node.children.reverse();
    for child in &mut node.children {
        if let Ast::Leaf(leaf) = child {
            if let Lexeme::Interval(interval) = &mut leaf.value {
                interval.invert();
            }
        }
    }
}

/// Melodic inversion: walk the interval chain from its first starting tone,
/// shifting each `to` pitch by the negated interval size and propagating the
/// running pitch forward.
pub fn mirror(node: &mut AstNode) {
    if !is_terminal_interval_node(node) {
        return;
    }
    let Some(first_from) = node.children.first().and_then(|child| match child {
        Ast::Leaf(leaf) => leaf.value.as_interval().and_then(|i| i.from.clone()),
        Ast::Node(_) => None,
    }) else {
        log::warn!("skipping mirror: first interval carries no starting tone");
        return;
    };

    let mut running = first_from;
    for child in &mut node.children {
        let Ast::Leaf(leaf) = child else { continue };
        let Lexeme::Interval(interval) = &mut leaf.value else {
            continue;
        };

        let shift = -interval.half_tone_steps;
        let mut to = match interval.to.take() {
            Some(to) => to,
            None => running.clone(),
        };
        to.note = running.note.transposed(shift);
        interval.from = Some(running);
        interval.to = Some(to.clone());
        running = to;
    }
}

/// Retrograde of the inversion.
pub fn mirror_cancer(node: &mut AstNode) {
    if !is_terminal_interval_node(node) {
        return;
    }
    cancer(node);
    mirror(node);
}

// -------------------------------------------------------------------------------------------------

fn double_with(node: &mut AstNode, op: NodeOp, label: &str, left_label: &str, right_label: &str) {
    if !is_terminal_interval_node(node) {
        return;
    }
    let mut left = node.clone();
    left.label = left_label.to_string();
    let mut right = node.clone();
    right.label = right_label.to_string();
    op(&mut right);

    node.label = label.to_string();
    node.children = vec![Ast::Node(left), Ast::Node(right)];
}

/// Play the node, then its retrograde.
pub fn cancer_double(node: &mut AstNode) {
    double_with(node, cancer, "CCRDB", "CCRDBL", "CCRDBR");
}

/// Play the node, then its inversion.
pub fn mirror_double(node: &mut AstNode) {
    double_with(node, mirror, "MRRDB", "MRRDBL", "MRRDBR");
}

/// Play the node, then its inverted retrograde.
pub fn mirror_cancer_double(node: &mut AstNode) {
    double_with(node, mirror_cancer, "MCDB", "MCDBL", "MCDBR");
}

// -------------------------------------------------------------------------------------------------

/// Apply node rewrites wherever a rule's label matches, in depth-first order.
/// The rule label `*` matches every node; the first matching rule wins.
#[derive(Clone, Debug)]
pub struct LabelMatch {
    rules: Vec<(String, NodeOp)>,
}

impl LabelMatch {
    pub fn new(rules: Vec<(String, NodeOp)>) -> Self {
        Self { rules }
    }
}

impl AstTransform for LabelMatch {
    fn apply(&mut self, ast: &mut Ast) {
        dft_mut(ast, &mut |tree| {
            if let Ast::Node(node) = tree {
                for (label, op) in &self.rules {
                    if *label == node.label || label == "*" {
                        op(node);
                        break;
                    }
                }
            }
        });
    }
}

// -------------------------------------------------------------------------------------------------
