//! Transform registry for speech text transformations.
//!
//! Transforms modify interpolated text before it is spoken (e.g. `@caps`,
//! `@upper`, `@spell`). Case mapping is locale-aware through ICU4X.

use std::collections::BTreeMap;

use icu_casemap::CaseMapper;
use icu_locale_core::LanguageIdentifier;
use unicode_segmentation::UnicodeSegmentation;

use crate::prefs::LanguageTag;
use crate::rules::Settings;

/// What a transform may consult besides its input.
#[derive(Debug)]
pub struct TransformContext<'a> {
    pub language: LanguageIdentifier,
    pub settings: &'a Settings,
}

impl<'a> TransformContext<'a> {
    pub fn new(language: &LanguageTag, settings: &'a Settings) -> Self {
        Self {
            language: language
                .as_str()
                .parse()
                .unwrap_or(LanguageIdentifier::UNKNOWN),
            settings,
        }
    }
}

/// Transform function signature.
pub type TransformFn = fn(&str, &TransformContext<'_>) -> String;

/// Registry for transform functions.
pub struct TransformRegistry {
    transforms: BTreeMap<String, TransformFn>,
}

impl TransformRegistry {
    /// Create a registry with the built-in transforms.
    pub fn new() -> Self {
        let mut registry = Self {
            transforms: BTreeMap::new(),
        };
        registry.register("caps", caps);
        registry.register("lower", lower);
        registry.register("upper", upper);
        registry.register("spell", spell);
        registry
    }

    /// Add or replace a transform.
    pub fn register(&mut self, name: impl Into<String>, transform: TransformFn) {
        self.transforms.insert(name.into(), transform);
    }

    /// Get a transform by name.
    pub fn get(&self, name: &str) -> Option<TransformFn> {
        self.transforms.get(name).copied()
    }

    /// Check if a transform exists.
    pub fn has_transform(&self, name: &str) -> bool {
        self.transforms.contains_key(name)
    }

    /// Registered transform names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.transforms.keys().map(String::as_str).collect()
    }
}

impl Default for TransformRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Speak each uppercase letter with the language's capital word.
fn caps(text: &str, context: &TransformContext<'_>) -> String {
    if !text.chars().any(char::is_uppercase) {
        return text.to_string();
    }
    text.graphemes(true)
        .filter(|grapheme| !grapheme.trim().is_empty())
        .map(|grapheme| {
            if grapheme.chars().any(char::is_uppercase) {
                format!("{} {grapheme}", context.settings.cap)
            } else {
                grapheme.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn lower(text: &str, context: &TransformContext<'_>) -> String {
    CaseMapper::new()
        .lowercase_to_string(text, &context.language)
        .to_string()
}

fn upper(text: &str, context: &TransformContext<'_>) -> String {
    CaseMapper::new()
        .uppercase_to_string(text, &context.language)
        .to_string()
}

/// Speak the text one grapheme at a time.
fn spell(text: &str, _context: &TransformContext<'_>) -> String {
    text.graphemes(true)
        .filter(|grapheme| !grapheme.trim().is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(name: &str, text: &str) -> String {
        let settings = Settings::default();
        let language: LanguageTag = "en".parse().unwrap();
        let context = TransformContext::new(&language, &settings);
        let transform = TransformRegistry::new().get(name).unwrap();
        transform(text, &context)
    }

    #[test]
    fn context_parses_language_tag() {
        let settings = Settings::default();
        let language: LanguageTag = "de-AT".parse().unwrap();
        let context = TransformContext::new(&language, &settings);
        assert_eq!(context.language.to_string(), "de-AT");
    }

    #[test]
    fn caps_prefixes_capital_letters() {
        assert_eq!(apply("caps", "Ax"), "cap A x");
        assert_eq!(apply("caps", "x"), "x");
    }

    #[test]
    fn spell_splits_graphemes() {
        assert_eq!(apply("spell", "sin"), "s i n");
    }

    #[test]
    fn case_mapping() {
        assert_eq!(apply("upper", "abc"), "ABC");
        assert_eq!(apply("lower", "ÄBC"), "äbc");
    }
}
