//! Error types for rule matching and rendering.

use thiserror::Error;

/// No rule in the resolved set applies to a node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("no rule matches node kind '{kind}'")]
    NoMatch { kind: String },
}

/// An error that occurred while rendering a node.
///
/// Failures below the root are recovered by speaking the failed subtree's
/// literal text; these errors only escape when there is nothing to speak.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// A named child is missing because the node has too few children.
    #[error("'{kind}' has no child '${child}': expected {expected} children, got {got}")]
    Arity {
        kind: String,
        child: String,
        expected: usize,
        got: usize,
    },

    /// A template references a child name the node kind does not have.
    #[error("rule '{rule}' references unknown child '${child}' of '{kind}'")]
    UnknownChild {
        kind: String,
        child: String,
        rule: String,
    },

    /// Unknown transform name.
    #[error("unknown transform '@{name}'")]
    UnknownTransform { name: String },

    /// Maximum recursion depth exceeded.
    #[error("maximum render depth of {limit} exceeded")]
    MaxDepthExceeded { limit: usize },

    #[error(transparent)]
    NoMatch(#[from] MatchError),

    /// The expression produced no speech at all.
    #[error("expression produced no speech")]
    Empty,
}
