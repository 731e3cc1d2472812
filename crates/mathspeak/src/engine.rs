//! Engine handle tying the rule store, preferences and renderer together.

use std::path::Path;
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tracing::debug;

use crate::markup;
use crate::prefs::{
    LanguageTag, PreferenceContext, PreferenceError, PreferenceName, PreferenceSet,
    PreferenceValue,
};
use crate::rules::{LoadError, RulePack, RuleStore};
use crate::speech::{RenderError, Speech, render_speech};

/// An error from turning markup into speech.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpeechError {
    /// No rule pack has been loaded.
    #[error("no rule pack loaded, initialize the engine first")]
    NotInitialized,

    #[error(transparent)]
    Parse(#[from] markup::ParseError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// A speech engine: an active rule pack plus active preferences.
///
/// Every render takes one pack snapshot and one preference snapshot up
/// front, so concurrent reloads and preference changes never mix within a
/// single call. Writes are serialized.
///
/// # Example
///
/// ```
/// use mathspeak::Engine;
///
/// let engine = Engine::builtin().unwrap();
/// let speech = engine.speak("<math><mi>x</mi><mo>=</mo><mn>5</mn></math>").unwrap();
/// assert_eq!(speech, "x is equal to 5");
///
/// engine.set_preference("Language", "de").unwrap();
/// let speech = engine.speak("<math><mi>x</mi><mo>=</mo><mn>5</mn></math>").unwrap();
/// assert_eq!(speech, "x ist gleich 5");
/// ```
#[derive(Debug, Default)]
pub struct Engine {
    rules: RuleStore,
    preferences: PreferenceContext,
    writer: Mutex<()>,
}

impl Engine {
    /// Create an engine with no rule pack loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with the pack in `dir` loaded.
    pub fn with_rules_dir(dir: impl AsRef<Path>) -> Result<Self, LoadError> {
        Ok(Self::with_pack(RulePack::load(dir)?))
    }

    /// Create an engine with the built-in pack loaded.
    pub fn builtin() -> Result<Self, LoadError> {
        Ok(Self::with_pack(RulePack::builtin()?))
    }

    /// Create an engine with `pack` active and default preferences.
    pub fn with_pack(pack: RulePack) -> Self {
        Self {
            rules: RuleStore::with_pack(pack),
            ..Self::default()
        }
    }

    /// Load the pack in `dir`, make it active, and reset preferences.
    ///
    /// On error the previous pack and preferences stay active.
    pub fn initialize(&self, dir: impl AsRef<Path>) -> Result<(), LoadError> {
        let pack = RulePack::load(dir)?;
        self.load_pack(pack);
        Ok(())
    }

    /// Make a loaded pack active and reset preferences to their defaults.
    pub fn load_pack(&self, pack: RulePack) {
        let _writer = self.writer.lock().expect("engine writer lock poisoned");
        debug!(version = pack.version(), "activating rule pack");
        self.rules.replace(pack);
        self.preferences.reset();
    }

    /// The active pack, if any.
    pub fn pack(&self) -> Option<Arc<RulePack>> {
        self.rules.current()
    }

    /// Set a preference.
    ///
    /// A `Language` must be one the active pack has rules for, either
    /// exactly or by its primary subtag.
    pub fn set_preference(&self, name: &str, value: &str) -> Result<(), PreferenceError> {
        let _writer = self.writer.lock().expect("engine writer lock poisoned");
        if PreferenceName::parse(name)? == PreferenceName::Language {
            let language: LanguageTag = value.parse()?;
            if let Some(pack) = self.rules.current() {
                if !pack.supports_language(&language) {
                    let available: Vec<&str> = pack.languages().collect();
                    return Err(PreferenceError::InvalidValue {
                        name: PreferenceName::Language.as_str().to_string(),
                        value: value.to_string(),
                        expected: format!(
                            "one of the pack's languages: {}",
                            available.join(", ")
                        ),
                    });
                }
            }
        }
        self.preferences.set_preference(name, value)
    }

    /// Current value of a preference.
    pub fn preference(&self, name: &str) -> Result<String, PreferenceError> {
        self.preferences.get_preference(name)
    }

    /// Snapshot of all current preferences.
    pub fn preferences(&self) -> Arc<PreferenceSet> {
        self.preferences.snapshot()
    }

    /// Render markup with the current preferences.
    pub fn speak(&self, markup: &str) -> Result<String, SpeechError> {
        let preferences = self.preferences.snapshot();
        self.speak_with(markup, &preferences)
    }

    /// Render markup with preferences overridden for this call only.
    pub fn speak_with(
        &self,
        markup: &str,
        preferences: &PreferenceSet,
    ) -> Result<String, SpeechError> {
        self.render(markup, preferences).map(|speech| speech.text)
    }

    /// Render markup, keeping fragments and degraded subtrees.
    pub fn render(
        &self,
        markup: &str,
        preferences: &PreferenceSet,
    ) -> Result<Speech, SpeechError> {
        let pack = self.rules.current().ok_or(SpeechError::NotInitialized)?;
        let tree = markup::parse(markup)?;
        let rules = pack.resolve(
            preferences.language().as_str(),
            preferences.speech_style().as_str(),
        );
        Ok(render_speech(&tree, &rules, preferences)?)
    }

    /// Version of the active pack, if any.
    pub fn version(&self) -> Option<String> {
        self.rules.current().map(|pack| pack.version().to_string())
    }
}
