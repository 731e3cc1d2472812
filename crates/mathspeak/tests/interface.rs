//! Tests for the process-wide interface.
//!
//! The interface wraps one shared engine, so every test here takes a lock
//! before touching it.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use mathspeak::{
    ERROR_PREFIX, InitError, LoadError, RULES_DIR_ENV, get_preference, get_version, initialize,
    render_to_speech, set_preference, try_render_to_speech,
};

static SHARED_ENGINE: Mutex<()> = Mutex::new(());

fn lock() -> MutexGuard<'static, ()> {
    SHARED_ENGINE
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

fn default_pack_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("rules")
}

fn initialized() -> MutexGuard<'static, ()> {
    let guard = lock();
    initialize(Some(&default_pack_dir())).unwrap();
    guard
}

fn set_rules_dir_env(dir: &Path) {
    // SAFETY: every test in this file holds `SHARED_ENGINE`, and none of
    // them reads the environment from another thread.
    unsafe {
        env::set_var(RULES_DIR_ENV, dir);
    }
}

fn clear_rules_dir_env() {
    // SAFETY: as in `set_rules_dir_env`.
    unsafe {
        env::remove_var(RULES_DIR_ENV);
    }
}

/// A pack that only echoes leaf text, with its own version.
fn write_echo_pack(version: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("base.rules"),
        format!(
            r#"@version = "{version}"; any_leaf = *[leaf] => "{{text}}"; any = * => "{{$children}}";"#
        ),
    )
    .unwrap();
    dir
}

/// At least three dot-separated numeric components.
fn is_version(text: &str) -> bool {
    let parts: Vec<&str> = text.split('.').collect();
    parts.len() >= 3
        && parts
            .iter()
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()))
}

// =========================================================================
// Rendering
// =========================================================================

#[test]
fn renders_scenarios() {
    let _guard = initialized();
    assert_eq!(render_to_speech("<math><mi>x</mi></math>"), "x");
    assert_eq!(
        render_to_speech("<math><mi>x</mi><mo>=</mo><mn>5</mn></math>"),
        "x is equal to 5"
    );
}

#[test]
fn language_switch_changes_output() {
    let _guard = initialized();
    let markup = "<math><mi>x</mi><mo>=</mo><msqrt><mn>5</mn></msqrt><mo>+</mo><mn>4</mn></math>";
    assert_eq!(
        render_to_speech(markup),
        "x is equal to, the square root of 5, end root; plus 4"
    );
    set_preference("Language", "de").unwrap();
    assert_eq!(
        render_to_speech(markup),
        "x ist gleich, die quadratwurzel von 5, ende der wurzel; plus 4"
    );
}

#[test]
fn malformed_markup_gives_sentinel() {
    let _guard = initialized();
    let speech = render_to_speech("not valid xml");
    assert!(speech.starts_with(ERROR_PREFIX), "speech: {speech}");
    assert!(speech.starts_with("-!ERROR!- "));
    assert!(try_render_to_speech("not valid xml").is_err());
}

// =========================================================================
// Preferences
// =========================================================================

#[test]
fn initialize_resets_preferences() {
    let _guard = initialized();
    set_preference("SpeechStyle", "SimpleSpeak").unwrap();
    assert_eq!(get_preference("SpeechStyle").unwrap(), "SimpleSpeak");
    initialize(Some(&default_pack_dir())).unwrap();
    assert_eq!(get_preference("SpeechStyle").unwrap(), "ClearSpeak");
}

#[test]
fn invalid_preferences_are_rejected() {
    let _guard = initialized();
    assert!(set_preference("SpeechStyel", "SimpleSpeak").is_err());
    assert!(set_preference("Verbosity", "Loud").is_err());
    assert!(set_preference("Language", "xx").is_err());
    assert_eq!(get_preference("Verbosity").unwrap(), "Verbose");
    assert_eq!(get_preference("Language").unwrap(), "en");
}

// =========================================================================
// Initialization and Version
// =========================================================================

#[test]
fn version_has_three_components() {
    let _guard = initialized();
    let version = get_version();
    assert!(is_version(&version), "version: {version}");
    assert_eq!(version, "0.4.0");
}

#[test]
fn missing_pack_keeps_previous_pack() {
    let _guard = initialized();
    let dir = tempfile::tempdir().unwrap();
    let err = initialize(Some(dir.path())).unwrap_err();
    assert!(matches!(err, InitError::Load(LoadError::MissingPack { .. })));
    assert_eq!(render_to_speech("<math><mi>x</mi></math>"), "x");
}

#[test]
fn initialize_without_dir_reads_environment() {
    let _guard = initialized();
    let pack = write_echo_pack("9.9.9");
    set_rules_dir_env(pack.path());
    let result = initialize(None);
    clear_rules_dir_env();
    result.unwrap();
    assert_eq!(get_version(), "9.9.9");
    assert_eq!(
        render_to_speech("<math><mi>x</mi><mo>=</mo><mn>5</mn></math>"),
        "x = 5"
    );
}

#[test]
fn initialize_without_dir_or_environment_fails() {
    let _guard = initialized();
    clear_rules_dir_env();
    let err = initialize(None).unwrap_err();
    assert!(matches!(err, InitError::NoRulesDir));
    assert_eq!(get_version(), "0.4.0");
    assert_eq!(
        render_to_speech("<math><mi>x</mi><mo>=</mo><mn>5</mn></math>"),
        "x is equal to 5"
    );
}

#[test]
fn environment_pointing_at_missing_pack_keeps_previous_pack() {
    let _guard = initialized();
    let empty = tempfile::tempdir().unwrap();
    set_rules_dir_env(empty.path());
    let result = initialize(None);
    clear_rules_dir_env();
    assert!(matches!(
        result.unwrap_err(),
        InitError::Load(LoadError::MissingPack { .. })
    ));
    assert_eq!(get_version(), "0.4.0");
}
