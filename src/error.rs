//! Errors reported to callers.
//!
//! Only two things can go wrong from the outside: a pattern that does not parse, and a
//! request to generate a string from a language that has none. Broken internal
//! invariants panic instead.

use thiserror::Error;

/// A pattern violates the grammar.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
#[error("{message} at position {position}")]
pub struct SyntaxError {
    /// 0-based character offset into the pattern.
    pub position: usize,
    pub message: String,
}

impl SyntaxError {
    pub fn new(position: usize, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum Error {
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    #[error("cannot generate a string from the empty language")]
    Generation,

    #[error("automaton '{name}' not found")]
    UndefinedAutomaton { name: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
