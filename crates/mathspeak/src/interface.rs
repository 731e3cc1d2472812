//! Process-wide speech engine.
//!
//! Provides thread-safe access to one shared [`Engine`], for callers that
//! want plain functions and string results instead of passing a handle
//! around.

use std::env;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use thiserror::Error;

use crate::engine::{Engine, SpeechError};
use crate::prefs::PreferenceError;
use crate::rules::LoadError;

/// Environment variable naming the rules directory when none is passed.
pub const RULES_DIR_ENV: &str = "MATHSPEAK_RULES_DIR";

/// Prefix of the string [`render_to_speech`] returns on failure.
pub const ERROR_PREFIX: &str = "-!ERROR!-";

static GLOBAL_ENGINE: LazyLock<Engine> = LazyLock::new(Engine::new);

/// An error from [`initialize`].
#[derive(Debug, Error)]
pub enum InitError {
    /// No directory was passed and the environment variable is unset.
    #[error("no rules directory given and MATHSPEAK_RULES_DIR is not set")]
    NoRulesDir,

    #[error(transparent)]
    Load(#[from] LoadError),
}

/// Load the rule pack and reset preferences to their defaults.
///
/// Without a directory, the `MATHSPEAK_RULES_DIR` environment variable is
/// used. On error the previously active pack stays active.
pub fn initialize(rules_dir: Option<&Path>) -> Result<(), InitError> {
    let dir = match rules_dir {
        Some(dir) => dir.to_path_buf(),
        None => env::var_os(RULES_DIR_ENV)
            .map(PathBuf::from)
            .ok_or(InitError::NoRulesDir)?,
    };
    GLOBAL_ENGINE.initialize(dir)?;
    Ok(())
}

/// Render markup to speech, or to an `ERROR_PREFIX` sentinel string.
pub fn render_to_speech(markup: &str) -> String {
    match try_render_to_speech(markup) {
        Ok(speech) => speech,
        Err(error) => format!("{ERROR_PREFIX} {error}"),
    }
}

/// Render markup to speech.
pub fn try_render_to_speech(markup: &str) -> Result<String, SpeechError> {
    GLOBAL_ENGINE.speak(markup)
}

/// Set a preference on the shared engine.
pub fn set_preference(name: &str, value: &str) -> Result<(), PreferenceError> {
    GLOBAL_ENGINE.set_preference(name, value)
}

/// Read a preference from the shared engine.
pub fn get_preference(name: &str) -> Result<String, PreferenceError> {
    GLOBAL_ENGINE.preference(name)
}

/// The loaded pack's version, or the library version before initialization.
pub fn get_version() -> String {
    GLOBAL_ENGINE
        .version()
        .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string())
}
