//! Backtracking recursive-descent parser with probabilistic production selection.

use std::fmt::Display;

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::grammar::{Grammar, Production, Symbol};
use crate::lexer::Token;
use crate::tree::SyntaxTree;

// -------------------------------------------------------------------------------------------------

/// The start symbol every top-level parse begins at.
pub const START_SYMBOL: &str = "S";

// -------------------------------------------------------------------------------------------------

/// Why a parse attempt failed at some position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FailReason {
    IndexOutOfBounds,
    TerminalMismatch,
    AllProductionsExhausted,
    /// Carries a rendering of the right-hand side that broke.
    SequenceMismatch(String),
    InvalidSymbol,
    TrailingInput,
}

impl Display for FailReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailReason::IndexOutOfBounds => write!(f, "index out of bounds"),
            FailReason::TerminalMismatch => write!(f, "terminal does not match"),
            FailReason::AllProductionsExhausted => write!(f, "all productions exhausted"),
            FailReason::SequenceMismatch(rhs) => {
                write!(f, "mismatch in right hand side sequence [{}]", rhs)
            }
            FailReason::InvalidSymbol => write!(f, "invalid symbol"),
            FailReason::TrailingInput => write!(f, "unconsumed trailing input"),
        }
    }
}

/// Structured parse failure: the failing symbol, the token index and the reason,
/// surfaced to the caller unmodified for debuggability.
#[derive(Clone, Debug, PartialEq)]
pub enum ParseError {
    EmptyInput,
    Failure {
        symbol: Symbol,
        index: usize,
        reason: FailReason,
    },
}

impl Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::EmptyInput => write!(f, "empty parser input"),
            ParseError::Failure {
                symbol,
                index,
                reason,
            } => write!(
                f,
                "parsing failed at position {} for symbol '{}': {}",
                index, symbol, reason
            ),
        }
    }
}

impl std::error::Error for ParseError {}

/// Internal failure value threaded through backtracking; becomes a
/// [`ParseError::Failure`] only when the whole run gives up.
#[derive(Clone, Debug)]
struct Failure {
    symbol: Symbol,
    index: usize,
    reason: FailReason,
}

fn fail<T>(symbol: Symbol, index: usize, reason: FailReason) -> Result<T, Failure> {
    Err(Failure {
        symbol,
        index,
        reason,
    })
}

// -------------------------------------------------------------------------------------------------

/// Recursive-descent parser over a token sequence.
///
/// Non-terminal alternatives are tried in an order that is re-randomized per
/// expansion: each candidate's static weight is multiplied with a fresh random
/// factor and the candidates sorted descending. The first production whose whole
/// right-hand side matches wins; failed alternatives are discarded without
/// memoization, so heavily ambiguous grammars are exponential in the worst case.
///
/// The random generator is seedable for reproducible parses; unseeded parsers draw
/// a seed from OS entropy. A parser holds no per-run state; `&mut self` on
/// [`Parser::run`] only serializes access to the generator.
#[derive(Debug, Clone)]
pub struct Parser {
    grammar: Grammar,
    require_all_consumed: bool,
    rand_gen: Xoshiro256PlusPlus,
    seed: Option<u64>,
}

impl Parser {
    pub fn new(grammar: Grammar) -> Self {
        let rand_seed = rand::rng().random();
        Self {
            grammar,
            require_all_consumed: false,
            rand_gen: Xoshiro256PlusPlus::seed_from_u64(rand_seed),
            seed: None,
        }
    }

    /// Use a fixed seed for the production-selection generator.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rand_gen = Xoshiro256PlusPlus::seed_from_u64(seed);
        self.seed = Some(seed);
        self
    }

    /// Whether a successful start-symbol match must also consume the entire token
    /// sequence. Off by default: trailing tokens are silently accepted, which
    /// allows prefix-matching grammars.
    #[must_use]
    pub fn require_all_consumed(mut self, require: bool) -> Self {
        self.require_all_consumed = require;
        self
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Rewind the random generator to its initial state, when the parser is seeded.
    pub fn reset(&mut self) {
        if let Some(seed) = self.seed {
            self.rand_gen = Xoshiro256PlusPlus::seed_from_u64(seed);
        }
    }

    /// Parse the given tokens starting at [`START_SYMBOL`], position 0.
    pub fn run(&mut self, tokens: &[Token]) -> Result<SyntaxTree, ParseError> {
        if tokens.is_empty() {
            return Err(ParseError::EmptyInput);
        }

        let start = Symbol::name(START_SYMBOL);
        match self.parse(tokens, &start, 0) {
            Ok((tree, index)) => {
                if self.require_all_consumed && index < tokens.len() {
                    Err(ParseError::Failure {
                        symbol: start,
                        index,
                        reason: FailReason::TrailingInput,
                    })
                } else {
                    Ok(tree)
                }
            }
            Err(failure) => Err(ParseError::Failure {
                symbol: failure.symbol,
                index: failure.index,
                reason: failure.reason,
            }),
        }
    }

    fn parse(
        &mut self,
        tokens: &[Token],
        symbol: &Symbol,
        index: usize,
    ) -> Result<(SyntaxTree, usize), Failure> {
        match symbol {
            Symbol::Name(name) if self.grammar.is_terminal(name) => {
                self.parse_terminal(tokens, name, index)
            }
            Symbol::Name(name) if self.grammar.is_non_terminal(name) => {
                self.parse_non_terminal(tokens, name, index)
            }
            Symbol::Empty => Ok((SyntaxTree::Empty, index)),
            Symbol::Any => self.parse_any(tokens, index),
            Symbol::Name(_) => fail(symbol.clone(), index, FailReason::InvalidSymbol),
        }
    }

    fn parse_terminal(
        &mut self,
        tokens: &[Token],
        name: &str,
        index: usize,
    ) -> Result<(SyntaxTree, usize), Failure> {
        let Some(token) = tokens.get(index) else {
            return fail(Symbol::name(name), index, FailReason::IndexOutOfBounds);
        };
        if token.name == name {
            Ok((SyntaxTree::leaf(name, token.clone()), index + 1))
        } else {
            fail(Symbol::name(name), index, FailReason::TerminalMismatch)
        }
    }

    /// The wildcard consumes any single token; the leaf keeps the token's own name
    /// so serialization round-trips.
    fn parse_any(
        &mut self,
        tokens: &[Token],
        index: usize,
    ) -> Result<(SyntaxTree, usize), Failure> {
        let Some(token) = tokens.get(index) else {
            return fail(Symbol::Any, index, FailReason::IndexOutOfBounds);
        };
        Ok((
            SyntaxTree::leaf(token.name.clone(), token.clone()),
            index + 1,
        ))
    }

    fn parse_non_terminal(
        &mut self,
        tokens: &[Token],
        name: &str,
        index: usize,
    ) -> Result<(SyntaxTree, usize), Failure> {
        // probabilistic permutation of the candidate list: re-weight and sort.
        // not a normalized distribution - a zero weight production still gets tried,
        // just rarely first.
        let rand_gen = &mut self.rand_gen;
        let mut candidates: Vec<(f32, Production)> = self
            .grammar
            .productions_of(name)
            .iter()
            .map(|production| {
                let weight = production.weight * rand_gen.random_range(0.0..1.0);
                (weight, production.clone())
            })
            .collect();
        candidates.sort_by(|(left, _), (right, _)| right.total_cmp(left));

        for (_, production) in &candidates {
            if production.rhs.len() > 1 {
                match self.parse_seq(tokens, &production.rhs, index) {
                    Ok((children, next)) => {
                        return Ok((
                            SyntaxTree::node(name, children, production.contraction),
                            next,
                        ));
                    }
                    Err(failure) => {
                        log::trace!("'{}' at {}: discarding alternative: {}", name, index, failure.reason);
                    }
                }
            } else {
                match self.parse(tokens, &production.rhs[0], index) {
                    Ok((child, next)) => {
                        return Ok((
                            SyntaxTree::node(name, vec![child], production.contraction),
                            next,
                        ));
                    }
                    Err(failure) => {
                        log::trace!("'{}' at {}: discarding alternative: {}", name, index, failure.reason);
                    }
                }
            }
        }

        fail(
            Symbol::name(name),
            index,
            FailReason::AllProductionsExhausted,
        )
    }

    /// Match a full right-hand-side sequence, threading the cursor through each
    /// symbol. The first sub-failure aborts the whole sequence.
    fn parse_seq(
        &mut self,
        tokens: &[Token],
        rhs: &[Symbol],
        index: usize,
    ) -> Result<(Vec<SyntaxTree>, usize), Failure> {
        let mut children = Vec::with_capacity(rhs.len());
        let mut cursor = index;

        for symbol in rhs {
            match self.parse(tokens, symbol, cursor) {
                Ok((tree, next)) => {
                    children.push(tree);
                    cursor = next;
                }
                Err(_) => {
                    let rendered: Vec<String> = rhs.iter().map(Symbol::to_string).collect();
                    return fail(
                        symbol.clone(),
                        cursor,
                        FailReason::SequenceMismatch(rendered.join(",")),
                    );
                }
            }
        }

        Ok((children, cursor))
    }
}

// -------------------------------------------------------------------------------------------------
