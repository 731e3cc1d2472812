//! Error types for loading rule packs.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that occur while loading a rule pack.
///
/// A pack that fails to load is never partially activated.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The pack directory or its `base.rules` file does not exist.
    #[error("no rule pack at '{path}': missing base.rules")]
    MissingPack { path: PathBuf },

    /// File I/O error when reading a rule file.
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Syntax or validation error with file location context.
    #[error("{origin}:{line}:{column}: {message}")]
    Syntax {
        origin: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    /// Two rules in one layer match the same nodes with the same score but
    /// say different things.
    #[error("{origin}: rules '{first}' and '{second}' match the same nodes with equal score")]
    AmbiguousRule {
        origin: PathBuf,
        first: String,
        second: String,
    },
}

impl LoadError {
    /// Build a validation error for a rule or directive at `line`.
    pub(crate) fn invalid(origin: &Path, line: usize, message: impl Into<String>) -> Self {
        LoadError::Syntax {
            origin: origin.to_path_buf(),
            line,
            column: 1,
            message: message.into(),
        }
    }
}

/// Append " (did you mean: a, b?)" when there are suggestions.
pub(crate) fn with_suggestions(message: String, suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        message
    } else {
        format!("{message} (did you mean: {}?)", suggestions.join(", "))
    }
}
