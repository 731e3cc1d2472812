//! Error types for preference updates.

use thiserror::Error;

/// An error from setting or reading a preference.
///
/// A failed update leaves every preference at its previous value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreferenceError {
    /// The preference name is not recognized.
    #[error("unknown preference '{name}'{}", format_suggestions(suggestions))]
    UnknownName {
        name: String,
        suggestions: Vec<String>,
    },

    /// The value is not allowed for this preference.
    #[error("invalid value '{value}' for preference '{name}', expected {expected}")]
    InvalidValue {
        name: String,
        value: String,
        expected: String,
    },
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(", did you mean: {}?", suggestions.join(", "))
    }
}
