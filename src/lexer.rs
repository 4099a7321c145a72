//! Classifies lexeme sequences into named terminal tokens via ordered predicate rules.

use std::fmt::{Debug, Display};

use serde::{Deserialize, Serialize};

use crate::lexeme::Lexeme;

// -------------------------------------------------------------------------------------------------

/// A lexeme tagged with the terminal symbol name the lexer chose for it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub name: String,
    pub lexeme: Lexeme,
}

impl Token {
    pub fn new<S: Into<String>>(name: S, lexeme: Lexeme) -> Self {
        Self {
            name: name.into(),
            lexeme,
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.name, self.lexeme)
    }
}

// -------------------------------------------------------------------------------------------------

/// A named classification predicate. Rule order is significant: the lexer takes the
/// first rule that matches, so more specific predicates must be declared before
/// catch-all ones.
pub struct Rule {
    name: String,
    predicate: Box<dyn Fn(&Lexeme) -> bool>,
}

impl Rule {
    pub fn new<S, P>(name: S, predicate: P) -> Self
    where
        S: Into<String>,
        P: Fn(&Lexeme) -> bool + 'static,
    {
        Self {
            name: name.into(),
            predicate: Box::new(predicate),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn matches(&self, lexeme: &Lexeme) -> bool {
        (self.predicate)(lexeme)
    }
}

impl Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("name", &self.name).finish()
    }
}

// -------------------------------------------------------------------------------------------------

/// Error raised when no rule matched a lexeme. Fatal for the whole run: the lexer
/// never emits a partial token sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LexError {
    NoMatchingRule { index: usize },
}

impl Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LexError::NoMatchingRule { index } => {
                write!(f, "no matching rule for lexeme at index {}", index)
            }
        }
    }
}

impl std::error::Error for LexError {}

// -------------------------------------------------------------------------------------------------

/// Maps an ordered, finite sequence of lexemes onto named terminal tokens.
/// Lexing is pure: no state is kept between runs.
#[derive(Debug)]
pub struct Lexer {
    rules: Vec<Rule>,
}

impl Lexer {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// The declared terminal names, in rule order. Used to validate grammars against
    /// this lexer's output alphabet.
    pub fn terminals(&self) -> Vec<String> {
        self.rules.iter().map(|rule| rule.name.clone()).collect()
    }

    fn classify(&self, lexeme: &Lexeme, index: usize) -> Result<Token, LexError> {
        for rule in &self.rules {
            if rule.matches(lexeme) {
                log::trace!("lexeme {} classified as '{}'", index, rule.name);
                return Ok(Token::new(rule.name.clone(), lexeme.clone()));
            }
        }
        Err(LexError::NoMatchingRule { index })
    }

    /// Classify all lexemes in order. Fails on the first lexeme no rule matches.
    pub fn run(&self, lexemes: &[Lexeme]) -> Result<Vec<Token>, LexError> {
        lexemes
            .iter()
            .enumerate()
            .map(|(index, lexeme)| self.classify(lexeme, index))
            .collect()
    }
}

// -------------------------------------------------------------------------------------------------
