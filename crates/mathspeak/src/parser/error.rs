//! Parse error types for `.rules` files.

use thiserror::Error;
use winnow::error::{ContextError, ErrMode, StrContext, StrContextValue};

/// An error that occurred while parsing a rule file or template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A syntax error with location information.
    #[error("syntax error at {line}:{column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },

    /// Unexpected end of input.
    #[error("unexpected end of input at {line}:{column}")]
    UnexpectedEof { line: usize, column: usize },
}

impl ParseError {
    /// Line, column and message, for wrapping into load errors and diagnostics.
    pub fn location(&self) -> (usize, usize, String) {
        match self {
            ParseError::Syntax {
                line,
                column,
                message,
            } => (*line, *column, message.clone()),
            ParseError::UnexpectedEof { line, column } => {
                (*line, *column, "unexpected end of file".to_string())
            }
        }
    }
}

/// Build a syntax error from a winnow failure at the remaining input.
pub(crate) fn syntax_error(
    original: &str,
    remaining: &str,
    error: ErrMode<ContextError>,
) -> ParseError {
    let (line, column) = calculate_position(original, remaining);
    let detail = match error {
        ErrMode::Backtrack(e) | ErrMode::Cut(e) => e.to_string(),
        ErrMode::Incomplete(_) => String::new(),
    };
    if remaining.is_empty() && detail.is_empty() {
        return ParseError::UnexpectedEof { line, column };
    }
    let message = if detail.is_empty() {
        match remaining.chars().next() {
            Some(c) => format!("unexpected character: '{c}'"),
            None => "unexpected end of input".to_string(),
        }
    } else {
        detail.replace('\n', "; ")
    };
    ParseError::Syntax {
        line,
        column,
        message,
    }
}

/// Calculate line and column from original input and remaining input.
pub(crate) fn calculate_position(original: &str, remaining: &str) -> (usize, usize) {
    let consumed = original.len() - remaining.len();
    let consumed_str = &original[..consumed];
    let line = consumed_str.chars().filter(|&c| c == '\n').count() + 1;
    let last_newline = consumed_str.rfind('\n');
    let column = match last_newline {
        Some(pos) => consumed - pos,
        None => consumed + 1,
    };
    (line, column)
}

/// Context naming what was being parsed.
pub(crate) fn label(what: &'static str) -> StrContext {
    StrContext::Label(what)
}

/// Context naming what the parser expected.
pub(crate) fn expected(what: &'static str) -> StrContext {
    StrContext::Expected(StrContextValue::Description(what))
}
