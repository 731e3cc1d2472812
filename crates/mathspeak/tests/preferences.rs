//! Integration tests for preference validation and the shared context.

use mathspeak::prefs::{
    DecimalSeparator, LanguageTag, NumericFormat, PreferenceContext, PreferenceError,
    PreferenceName, PreferenceSet, PreferenceValue, SpeechStyle, Verbosity,
};
use mathspeak::{Engine, RulePack};

// =========================================================================
// Defaults and Builder
// =========================================================================

#[test]
fn defaults() {
    let prefs = PreferenceSet::default();
    assert_eq!(prefs.language().as_str(), "en");
    assert_eq!(prefs.speech_style(), SpeechStyle::ClearSpeak);
    assert_eq!(prefs.verbosity(), Verbosity::Verbose);
    assert_eq!(prefs.numeric_format(), NumericFormat::Digits);
    assert_eq!(prefs.decimal_separator(), DecimalSeparator::Auto);
}

#[test]
fn builder_defaults_unset_fields() {
    let prefs = PreferenceSet::builder()
        .verbosity(Verbosity::Terse)
        .build();
    assert_eq!(prefs.verbosity(), Verbosity::Terse);
    assert_eq!(prefs.language(), &LanguageTag::default());
    assert_eq!(prefs.speech_style(), SpeechStyle::ClearSpeak);
}

#[test]
fn entries_list_every_preference() {
    let prefs = PreferenceSet::default();
    let entries: Vec<(String, String)> = prefs
        .entries()
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect();
    assert_eq!(
        entries,
        vec![
            ("Language".to_string(), "en".to_string()),
            ("SpeechStyle".to_string(), "ClearSpeak".to_string()),
            ("Verbosity".to_string(), "Verbose".to_string()),
            ("NumericFormat".to_string(), "Digits".to_string()),
            ("DecimalSeparator".to_string(), "Auto".to_string()),
        ]
    );
}

// =========================================================================
// Set and Get
// =========================================================================

#[test]
fn names_and_values_ignore_case() {
    let mut prefs = PreferenceSet::default();
    prefs.set("speechstyle", "simplespeak").unwrap();
    prefs.set("VERBOSITY", "medium").unwrap();
    assert_eq!(prefs.get("SpeechStyle").unwrap(), "SimpleSpeak");
    assert_eq!(prefs.get("verbosity").unwrap(), "Medium");
}

#[test]
fn language_values_are_normalized() {
    let mut prefs = PreferenceSet::default();
    prefs.set("Language", " de_at ").unwrap();
    assert_eq!(prefs.get("Language").unwrap(), "de-AT");
    assert_eq!(prefs.language().primary(), "de");
}

#[test]
fn decimal_separator_values() {
    let mut prefs = PreferenceSet::default();
    prefs.set("DecimalSeparator", ",").unwrap();
    assert_eq!(prefs.decimal_separator(), DecimalSeparator::Comma);
    assert_eq!(prefs.decimal_separator().resolve("."), ",");
    assert_eq!(DecimalSeparator::Auto.resolve(","), ",");
}

#[test]
fn unknown_name_suggests_close_names() {
    let prefs = PreferenceSet::default();
    let err = prefs.get("Verbosty").unwrap_err();
    assert_eq!(
        err,
        PreferenceError::UnknownName {
            name: "Verbosty".to_string(),
            suggestions: vec!["Verbosity".to_string()],
        }
    );
    assert_eq!(
        err.to_string(),
        "unknown preference 'Verbosty', did you mean: Verbosity?"
    );
}

#[test]
fn unknown_name_without_suggestions() {
    let err = PreferenceName::parse("Colour").unwrap_err();
    assert_eq!(err.to_string(), "unknown preference 'Colour'");
}

#[test]
fn invalid_value_lists_allowed_values() {
    let mut prefs = PreferenceSet::default();
    let err = prefs.set("NumericFormat", "Roman").unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid value 'Roman' for preference 'NumericFormat', expected Digits, Grouped, DigitByDigit"
    );
    assert_eq!(prefs.numeric_format(), NumericFormat::Digits);
}

#[test]
fn invalid_language_is_rejected() {
    let mut prefs = PreferenceSet::default();
    assert!(matches!(
        prefs.set("Language", "not a language!"),
        Err(PreferenceError::InvalidValue { .. })
    ));
    assert_eq!(prefs.language().as_str(), "en");
}

#[test]
fn allowed_values() {
    assert_eq!(PreferenceName::Language.allowed_values(), None);
    assert_eq!(
        PreferenceName::Verbosity.allowed_values(),
        Some(vec!["Terse", "Medium", "Verbose"])
    );
    assert_eq!(SpeechStyle::expected(), "ClearSpeak, SimpleSpeak");
}

// =========================================================================
// Shared Context
// =========================================================================

#[test]
fn snapshots_are_unaffected_by_later_writes() {
    let context = PreferenceContext::new();
    let before = context.snapshot();
    context.set_preference("Verbosity", "Terse").unwrap();
    assert_eq!(before.verbosity(), Verbosity::Verbose);
    assert_eq!(context.snapshot().verbosity(), Verbosity::Terse);
}

#[test]
fn failed_write_keeps_current_set() {
    let context = PreferenceContext::new();
    context.set_preference("SpeechStyle", "SimpleSpeak").unwrap();
    let before = context.snapshot();
    assert!(context.set_preference("SpeechStyle", "Loud").is_err());
    assert!(context.set_preference("Nope", "x").is_err());
    assert_eq!(*context.snapshot(), *before);
}

#[test]
fn reset_restores_defaults() {
    let context = PreferenceContext::with_preferences(
        PreferenceSet::builder()
            .speech_style(SpeechStyle::SimpleSpeak)
            .build(),
    );
    assert_eq!(context.get_preference("SpeechStyle").unwrap(), "SimpleSpeak");
    context.reset();
    assert_eq!(context.get_preference("SpeechStyle").unwrap(), "ClearSpeak");
}

// =========================================================================
// Engine Preferences
// =========================================================================

#[test]
fn engine_rejects_languages_missing_from_pack() {
    let engine = Engine::builtin().unwrap();
    let err = engine.set_preference("Language", "fr").unwrap_err();
    assert!(err.to_string().contains("de, en"), "message: {err}");
    assert_eq!(engine.preference("Language").unwrap(), "en");
}

#[test]
fn engine_accepts_regional_variants() {
    let engine = Engine::builtin().unwrap();
    engine.set_preference("Language", "de-CH").unwrap();
    assert_eq!(engine.preference("Language").unwrap(), "de-CH");
}

#[test]
fn engine_reload_resets_preferences() {
    let engine = Engine::builtin().unwrap();
    engine.set_preference("Verbosity", "Terse").unwrap();
    engine.load_pack(RulePack::builtin().unwrap());
    assert_eq!(engine.preferences().verbosity(), Verbosity::Verbose);
}
