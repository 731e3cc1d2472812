//! Preference values and the immutable preference snapshot.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use bon::Builder;
use icu_locale_core::LanguageIdentifier;
use serde::Serialize;

use crate::prefs::PreferenceError;
use crate::suggest::compute_suggestions;

/// A value type with a fixed set of spellings.
pub trait PreferenceValue: Sized + Copy + 'static {
    /// Every allowed value, in display order.
    const ALL: &'static [Self];

    /// Canonical spelling of the value.
    fn as_str(self) -> &'static str;

    /// Parse a value, ignoring ASCII case.
    fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|value| value.as_str().eq_ignore_ascii_case(name.trim()))
    }

    /// The allowed spellings joined for error messages.
    fn expected() -> String {
        let names: Vec<&str> = Self::ALL.iter().map(|value| value.as_str()).collect();
        names.join(", ")
    }
}

macro_rules! preference_value {
    ($ty:ident, $pref:literal) => {
        impl FromStr for $ty {
            type Err = PreferenceError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                <$ty as PreferenceValue>::from_name(value).ok_or_else(|| {
                    PreferenceError::InvalidValue {
                        name: $pref.to_string(),
                        value: value.to_string(),
                        expected: <$ty as PreferenceValue>::expected(),
                    }
                })
            }
        }

        impl Display for $ty {
            fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
                f.write_str(self.as_str())
            }
        }
    };
}

/// Which speech style's rules are layered over the language rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum SpeechStyle {
    #[default]
    ClearSpeak,
    SimpleSpeak,
}

impl PreferenceValue for SpeechStyle {
    const ALL: &'static [Self] = &[SpeechStyle::ClearSpeak, SpeechStyle::SimpleSpeak];

    fn as_str(self) -> &'static str {
        match self {
            SpeechStyle::ClearSpeak => "ClearSpeak",
            SpeechStyle::SimpleSpeak => "SimpleSpeak",
        }
    }
}

preference_value!(SpeechStyle, "SpeechStyle");

/// How much descriptive speech rules may add.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Verbosity {
    Terse,
    Medium,
    #[default]
    Verbose,
}

impl PreferenceValue for Verbosity {
    const ALL: &'static [Self] = &[Verbosity::Terse, Verbosity::Medium, Verbosity::Verbose];

    fn as_str(self) -> &'static str {
        match self {
            Verbosity::Terse => "Terse",
            Verbosity::Medium => "Medium",
            Verbosity::Verbose => "Verbose",
        }
    }
}

preference_value!(Verbosity, "Verbosity");

/// How `{number}` speaks numeric text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum NumericFormat {
    /// As written.
    #[default]
    Digits,
    /// Integer digits grouped in threes.
    Grouped,
    /// One digit word at a time.
    DigitByDigit,
}

impl PreferenceValue for NumericFormat {
    const ALL: &'static [Self] = &[
        NumericFormat::Digits,
        NumericFormat::Grouped,
        NumericFormat::DigitByDigit,
    ];

    fn as_str(self) -> &'static str {
        match self {
            NumericFormat::Digits => "Digits",
            NumericFormat::Grouped => "Grouped",
            NumericFormat::DigitByDigit => "DigitByDigit",
        }
    }
}

preference_value!(NumericFormat, "NumericFormat");

/// Which character separates the integer and fractional parts of numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum DecimalSeparator {
    /// Use the language's `number.decimal` directive.
    #[default]
    Auto,
    #[serde(rename = ".")]
    Dot,
    #[serde(rename = ",")]
    Comma,
}

impl PreferenceValue for DecimalSeparator {
    const ALL: &'static [Self] = &[
        DecimalSeparator::Auto,
        DecimalSeparator::Dot,
        DecimalSeparator::Comma,
    ];

    fn as_str(self) -> &'static str {
        match self {
            DecimalSeparator::Auto => "Auto",
            DecimalSeparator::Dot => ".",
            DecimalSeparator::Comma => ",",
        }
    }
}

impl DecimalSeparator {
    /// The separator to use given the language's default.
    pub fn resolve(self, language_default: &str) -> &str {
        match self {
            DecimalSeparator::Auto => language_default,
            DecimalSeparator::Dot => ".",
            DecimalSeparator::Comma => ",",
        }
    }
}

preference_value!(DecimalSeparator, "DecimalSeparator");

/// A validated, normalized BCP-47 language tag such as `en` or `de-AT`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct LanguageTag(String);

impl LanguageTag {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The primary language subtag: `de` for `de-AT`.
    pub fn primary(&self) -> &str {
        self.0.split('-').next().unwrap_or(&self.0)
    }
}

impl Default for LanguageTag {
    fn default() -> Self {
        LanguageTag("en".to_string())
    }
}

impl FromStr for LanguageTag {
    type Err = PreferenceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let identifier: LanguageIdentifier =
            value
                .trim()
                .replace('_', "-")
                .parse()
                .map_err(|_| PreferenceError::InvalidValue {
                    name: PreferenceName::Language.as_str().to_string(),
                    value: value.to_string(),
                    expected: "a BCP-47 language code such as en or de-AT".to_string(),
                })?;
        Ok(LanguageTag(identifier.to_string()))
    }
}

impl Display for LanguageTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

/// The recognized preference names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PreferenceName {
    Language,
    SpeechStyle,
    Verbosity,
    NumericFormat,
    DecimalSeparator,
}

impl PreferenceName {
    pub const ALL: [PreferenceName; 5] = [
        PreferenceName::Language,
        PreferenceName::SpeechStyle,
        PreferenceName::Verbosity,
        PreferenceName::NumericFormat,
        PreferenceName::DecimalSeparator,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PreferenceName::Language => "Language",
            PreferenceName::SpeechStyle => "SpeechStyle",
            PreferenceName::Verbosity => "Verbosity",
            PreferenceName::NumericFormat => "NumericFormat",
            PreferenceName::DecimalSeparator => "DecimalSeparator",
        }
    }

    /// Look up a preference by name, ignoring ASCII case.
    pub fn parse(name: &str) -> Result<PreferenceName, PreferenceError> {
        if let Some(found) = Self::ALL
            .iter()
            .copied()
            .find(|candidate| candidate.as_str().eq_ignore_ascii_case(name))
        {
            return Ok(found);
        }
        let names: Vec<&str> = Self::ALL.iter().map(|n| n.as_str()).collect();
        Err(PreferenceError::UnknownName {
            name: name.to_string(),
            suggestions: compute_suggestions(name, &names),
        })
    }

    /// Allowed values, for listings. `None` for free-form values.
    pub fn allowed_values(self) -> Option<Vec<&'static str>> {
        fn names<T: PreferenceValue>() -> Vec<&'static str> {
            T::ALL.iter().map(|value| value.as_str()).collect()
        }
        match self {
            PreferenceName::Language => None,
            PreferenceName::SpeechStyle => Some(names::<SpeechStyle>()),
            PreferenceName::Verbosity => Some(names::<Verbosity>()),
            PreferenceName::NumericFormat => Some(names::<NumericFormat>()),
            PreferenceName::DecimalSeparator => Some(names::<DecimalSeparator>()),
        }
    }
}

impl Display for PreferenceName {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// An immutable snapshot of the active preferences.
///
/// # Example
///
/// ```
/// use mathspeak::prefs::{PreferenceSet, SpeechStyle};
///
/// let prefs = PreferenceSet::builder()
///     .language("de".parse().unwrap())
///     .speech_style(SpeechStyle::SimpleSpeak)
///     .build();
///
/// assert_eq!(prefs.get("Language").unwrap(), "de");
/// assert_eq!(prefs.get("SpeechStyle").unwrap(), "SimpleSpeak");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Builder, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PreferenceSet {
    #[builder(default)]
    language: LanguageTag,

    #[builder(default)]
    speech_style: SpeechStyle,

    #[builder(default)]
    verbosity: Verbosity,

    #[builder(default)]
    numeric_format: NumericFormat,

    #[builder(default)]
    decimal_separator: DecimalSeparator,
}

impl PreferenceSet {
    pub fn language(&self) -> &LanguageTag {
        &self.language
    }

    pub fn speech_style(&self) -> SpeechStyle {
        self.speech_style
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    pub fn numeric_format(&self) -> NumericFormat {
        self.numeric_format
    }

    pub fn decimal_separator(&self) -> DecimalSeparator {
        self.decimal_separator
    }

    /// Set a preference by name.
    ///
    /// The value is fully validated before anything is assigned, so a
    /// failure leaves the set unchanged.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), PreferenceError> {
        match PreferenceName::parse(name)? {
            PreferenceName::Language => self.language = value.parse()?,
            PreferenceName::SpeechStyle => self.speech_style = value.parse()?,
            PreferenceName::Verbosity => self.verbosity = value.parse()?,
            PreferenceName::NumericFormat => self.numeric_format = value.parse()?,
            PreferenceName::DecimalSeparator => self.decimal_separator = value.parse()?,
        }
        Ok(())
    }

    /// Get a preference's current value by name.
    pub fn get(&self, name: &str) -> Result<String, PreferenceError> {
        Ok(self.value(PreferenceName::parse(name)?))
    }

    /// A preference's current value.
    pub fn value(&self, name: PreferenceName) -> String {
        match name {
            PreferenceName::Language => self.language.to_string(),
            PreferenceName::SpeechStyle => self.speech_style.to_string(),
            PreferenceName::Verbosity => self.verbosity.to_string(),
            PreferenceName::NumericFormat => self.numeric_format.to_string(),
            PreferenceName::DecimalSeparator => self.decimal_separator.to_string(),
        }
    }

    /// Every preference with its current value, in listing order.
    pub fn entries(&self) -> Vec<(PreferenceName, String)> {
        PreferenceName::ALL
            .iter()
            .map(|name| (*name, self.value(*name)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_tags_are_normalized() {
        let tag: LanguageTag = "DE_at".parse().unwrap();
        assert_eq!(tag.as_str(), "de-AT");
        assert_eq!(tag.primary(), "de");
    }

    #[test]
    fn failed_set_keeps_previous_value() {
        let mut prefs = PreferenceSet::default();
        prefs.set("SpeechStyle", "SimpleSpeak").unwrap();
        assert!(prefs.set("SpeechStyle", "LoudSpeak").is_err());
        assert_eq!(prefs.speech_style(), SpeechStyle::SimpleSpeak);
    }
}
