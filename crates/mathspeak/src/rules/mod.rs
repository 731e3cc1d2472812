//! Layered speech rules.
//!
//! A [`RulePack`] holds a base layer, per-language layers and per-style
//! layers. [`RulePack::resolve`] merges the layers that apply to one
//! language and style into [`ResolvedRules`], and [`RuleStore`] publishes the
//! active pack to readers.

mod error;
mod layer;
mod pack;
mod resolved;
mod settings;
mod store;

pub use error::LoadError;
pub use layer::{Layer, LayerKind, Rule};
pub use pack::RulePack;
pub use resolved::ResolvedRules;
pub use settings::{KNOWN_DIRECTIVES, Settings};
pub use store::RuleStore;
