//! The motivic prelude.
//!
//! The purpose of this module is to alleviate imports of the common pipeline types:
//!
//! ```
//! # #![allow(unused_imports)]
//! use motivic::prelude::*;
//! ```

pub use super::{
    annotate::{annotate_note_values, derive_intervals, interleave_intervals, mark_peaks},
    grammar::{Contraction, Grammar, GrammarError, Production, ProductionRule, Symbol},
    lexeme::{Interval, Lexeme, Rest, Tone},
    lexer::{LexError, Lexer, Rule, Token},
    note::Note,
    parser::{FailReason, ParseError, Parser, START_SYMBOL},
    presets,
    transform::{serialize::flatten, AstTransform, Identity, Pipeline},
    tree::{bft, dft, dft_mut, to_dot, Ast, AstLeaf, AstNode, AstValue, StLeaf, StNode,
        SyntaxTree, TreeError, TreeNode},
};
