//! Weighted production grammars over the lexer's terminal alphabet.

use std::collections::{HashMap, HashSet};
use std::fmt::Display;

use derive_more::Display;

use crate::tree::{Ast, StNode, TreeError};

// -------------------------------------------------------------------------------------------------

/// A grammar symbol as it appears in a production's right-hand side.
///
/// `Empty` is the reserved epsilon marker: it always matches without consuming input.
/// `Any` is the wildcard terminal: it matches exactly one token of any name.
#[derive(Clone, Debug, Display, PartialEq, Eq, Hash)]
pub enum Symbol {
    #[display("{_0}")]
    Name(String),
    #[display("ε")]
    Empty,
    #[display("*")]
    Any,
}

impl Symbol {
    pub fn name<S: Into<String>>(name: S) -> Self {
        Symbol::Name(name.into())
    }
}

/// Shorthand for building right-hand sides: `""` maps to the epsilon marker and
/// `"*"` to the wildcard, everything else to a named symbol.
impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        match name {
            "" => Symbol::Empty,
            "*" => Symbol::Any,
            _ => Symbol::Name(name.to_string()),
        }
    }
}

// -------------------------------------------------------------------------------------------------

/// Custom syntax-tree to AST conversion, attached to a single production.
pub type CustomTransform = fn(&StNode) -> Result<Option<Ast>, TreeError>;

/// The tree-contraction strategy a production stamps onto the syntax-tree nodes it
/// produces. Resolved once at grammar construction, then copied into each node,
/// so nodes never carry closures.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Contraction {
    /// Keep the node: label plus all transformed children (epsilon children dropped).
    Subtree,
    /// Delegate to the only child, eliding a pass-through non-terminal.
    BubbleOne,
    /// Collapse a right-recursive chain into one flat node.
    ContractRight,
    /// A production-specific conversion function.
    Custom(CustomTransform),
}

// -------------------------------------------------------------------------------------------------

/// A single production as supplied by configuration: `lhs -> rhs` with a selection
/// weight and an optional explicit contraction strategy.
#[derive(Clone, Debug)]
pub struct ProductionRule {
    pub lhs: String,
    pub weight: f32,
    pub rhs: Vec<Symbol>,
    pub contraction: Option<Contraction>,
}

impl ProductionRule {
    pub fn new<S: Into<String>>(lhs: S, weight: f32, rhs: Vec<Symbol>) -> Self {
        Self {
            lhs: lhs.into(),
            weight,
            rhs,
            contraction: None,
        }
    }

    #[must_use]
    pub fn with_contraction(mut self, contraction: Contraction) -> Self {
        self.contraction = Some(contraction);
        self
    }

    /// Right-expanding productions like `LIST -> item LIST` re-appear as the last
    /// symbol of their own right-hand side.
    fn is_right_expanding(&self) -> bool {
        self.rhs.len() > 1 && self.rhs.last() == Some(&Symbol::Name(self.lhs.clone()))
    }

    fn default_contraction(&self) -> Contraction {
        if self.is_right_expanding() {
            Contraction::ContractRight
        } else if self.rhs.len() == 1 {
            Contraction::BubbleOne
        } else {
            Contraction::Subtree
        }
    }
}

/// A validated production body, indexed under its non-terminal.
#[derive(Clone, Debug)]
pub struct Production {
    pub weight: f32,
    pub rhs: Vec<Symbol>,
    pub contraction: Contraction,
}

// -------------------------------------------------------------------------------------------------

/// Malformed grammar configuration. All variants are raised at construction time;
/// a successfully constructed grammar never fails validation during parsing.
#[derive(Clone, Debug, PartialEq)]
pub enum GrammarError {
    NoTerminals,
    BlankTerminal,
    NoProductions,
    BlankLhs,
    EmptyRhs { lhs: String },
    InvalidRhsSymbol { lhs: String, symbol: Symbol },
}

impl Display for GrammarError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GrammarError::NoTerminals => write!(f, "no terminals provided"),
            GrammarError::BlankTerminal => write!(f, "terminal names must not be blank"),
            GrammarError::NoProductions => write!(f, "no productions provided"),
            GrammarError::BlankLhs => write!(f, "production lhs must not be blank"),
            GrammarError::EmptyRhs { lhs } => {
                write!(f, "production for '{}' has an empty rhs", lhs)
            }
            GrammarError::InvalidRhsSymbol { lhs, symbol } => {
                write!(f, "invalid symbol in rhs of '{}': {}", lhs, symbol)
            }
        }
    }
}

impl std::error::Error for GrammarError {}

// -------------------------------------------------------------------------------------------------

/// An immutable, validated set of weighted productions. Every production left-hand
/// side becomes a non-terminal; every right-hand-side symbol must be a declared
/// terminal, a non-terminal, the epsilon marker or the wildcard.
///
/// Production lists are stored sorted by descending weight, but the parser re-weights
/// candidates probabilistically on every expansion (see [`Parser`](crate::Parser)).
#[derive(Clone, Debug)]
pub struct Grammar {
    terminals: HashSet<String>,
    non_terminals: HashSet<String>,
    productions: HashMap<String, Vec<Production>>,
}

impl Grammar {
    /// Validate and index a grammar from the terminal alphabet (usually
    /// [`Lexer::terminals`](crate::Lexer::terminals)) and a production list.
    pub fn from_rules(
        terminals: Vec<String>,
        rules: Vec<ProductionRule>,
    ) -> Result<Self, GrammarError> {
        if terminals.is_empty() {
            return Err(GrammarError::NoTerminals);
        }
        if terminals.iter().any(|name| name.is_empty()) {
            return Err(GrammarError::BlankTerminal);
        }
        if rules.is_empty() {
            return Err(GrammarError::NoProductions);
        }
        if rules.iter().any(|rule| rule.lhs.is_empty()) {
            return Err(GrammarError::BlankLhs);
        }

        let terminals: HashSet<String> = terminals.into_iter().collect();
        let non_terminals: HashSet<String> =
            rules.iter().map(|rule| rule.lhs.clone()).collect();

        for rule in &rules {
            if rule.rhs.is_empty() {
                return Err(GrammarError::EmptyRhs {
                    lhs: rule.lhs.clone(),
                });
            }
            for symbol in &rule.rhs {
                if let Symbol::Name(name) = symbol {
                    if !terminals.contains(name) && !non_terminals.contains(name) {
                        return Err(GrammarError::InvalidRhsSymbol {
                            lhs: rule.lhs.clone(),
                            symbol: symbol.clone(),
                        });
                    }
                }
            }
        }

        let mut productions: HashMap<String, Vec<Production>> = non_terminals
            .iter()
            .map(|nt| (nt.clone(), Vec::new()))
            .collect();
        for rule in rules {
            let contraction = rule.contraction.unwrap_or_else(|| rule.default_contraction());
            if let Some(bodies) = productions.get_mut(&rule.lhs) {
                bodies.push(Production {
                    weight: rule.weight,
                    rhs: rule.rhs,
                    contraction,
                });
            }
        }
        for bodies in productions.values_mut() {
            bodies.sort_by(|left, right| right.weight.total_cmp(&left.weight));
        }

        Ok(Self {
            terminals,
            non_terminals,
            productions,
        })
    }

    pub fn is_terminal(&self, name: &str) -> bool {
        self.terminals.contains(name)
    }

    pub fn is_non_terminal(&self, name: &str) -> bool {
        self.non_terminals.contains(name)
    }

    /// All productions of the given non-terminal, sorted by descending static weight.
    pub fn productions_of(&self, non_terminal: &str) -> &[Production] {
        self.productions
            .get(non_terminal)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn terminals(&self) -> &HashSet<String> {
        &self.terminals
    }

    pub fn non_terminals(&self) -> &HashSet<String> {
        &self.non_terminals
    }
}

// -------------------------------------------------------------------------------------------------
