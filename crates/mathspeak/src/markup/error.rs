//! Error types for the markup parser.

use thiserror::Error;

/// An error that occurred while parsing MathML markup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The input is not well-formed markup.
    #[error("malformed markup at {line}:{column}: {message}")]
    Malformed {
        line: usize,
        column: usize,
        message: String,
    },

    /// Elements are nested deeper than the parser accepts.
    #[error("markup nested deeper than {limit} elements at {line}:{column}")]
    TooDeep {
        line: usize,
        column: usize,
        limit: usize,
    },
}

impl ParseError {
    /// Line and column of the error, both 1-based.
    pub fn position(&self) -> (usize, usize) {
        match self {
            ParseError::Malformed { line, column, .. } | ParseError::TooDeep { line, column, .. } => {
                (*line, *column)
            }
        }
    }
}
