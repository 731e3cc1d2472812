//! Speech rule file and template parser.
//!
//! This module provides parsing for speech templates and `.rules` files.
//! The parser produces an AST that the rule store validates and the renderer
//! interprets, and that external tooling can inspect.

pub mod ast;
pub mod error;
mod file;
mod template;

pub use ast::*;
pub use error::ParseError;
pub use file::parse_file;
pub use template::parse_template;
