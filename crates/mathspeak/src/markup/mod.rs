//! MathML markup parsing.
//!
//! Turns markup text into an immutable [`ExpressionNode`] tree. Unsupported
//! elements become [`NodeKind::Unknown`] nodes rather than failing the parse.

mod error;
mod mathml;
mod node;

pub use error::ParseError;
pub use mathml::{MAX_NESTING, parse};
pub use node::{ExpressionNode, KNOWN_KINDS, NodeKind, OperatorRole, UNKNOWN_KIND};
