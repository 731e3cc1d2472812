//! Rule-driven, locale-aware MathML to speech text.
//!
//! Markup is parsed into an [`ExpressionNode`] tree, each node is matched
//! against layered declarative rules (base, language, speech style), and the
//! winning templates produce speech fragments that are joined into text.

pub mod engine;
pub mod interface;
pub mod markup;
pub mod parser;
pub mod prefs;
pub mod rules;
pub mod speech;
mod suggest;

pub use engine::{Engine, SpeechError};
pub use interface::{
    ERROR_PREFIX, InitError, RULES_DIR_ENV, get_preference, get_version, initialize,
    render_to_speech, set_preference, try_render_to_speech,
};
pub use markup::{ExpressionNode, NodeKind};
pub use prefs::{PreferenceError, PreferenceSet};
pub use rules::{LoadError, RulePack};
pub use speech::{RenderError, Speech};
pub use suggest::compute_suggestions;
