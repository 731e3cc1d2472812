//! Speech preferences.
//!
//! A [`PreferenceSet`] is an immutable snapshot; [`PreferenceContext`] shares
//! the active snapshot between threads.

mod context;
mod error;
mod preferences;

pub use context::PreferenceContext;
pub use error::PreferenceError;
pub use preferences::{
    DecimalSeparator, LanguageTag, NumericFormat, PreferenceName, PreferenceSet, PreferenceValue,
    SpeechStyle, Verbosity,
};
