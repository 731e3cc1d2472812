//! Typed view of `@directive` settings.

use crate::parser::{Directive, PauseStrength};

/// Directive names a rule file may set.
pub const KNOWN_DIRECTIVES: &[&str] = &[
    "version",
    "language.name",
    "pause.short",
    "pause.medium",
    "pause.long",
    "number.group",
    "number.decimal",
    "number.point",
    "number.minus",
    "digit.0",
    "digit.1",
    "digit.2",
    "digit.3",
    "digit.4",
    "digit.5",
    "digit.6",
    "digit.7",
    "digit.8",
    "digit.9",
    "cap",
];

/// Settings merged from the directives of every active layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Display name of the language, e.g. "Deutsch".
    pub language_name: Option<String>,
    pub pause_short: String,
    pub pause_medium: String,
    pub pause_long: String,
    /// Separator between digit groups for `NumericFormat::Grouped`.
    pub number_group: String,
    /// The language's decimal mark, used when `DecimalSeparator` is `Auto`.
    pub number_decimal: String,
    /// Word spoken for the decimal mark in digit-by-digit mode.
    pub number_point: String,
    /// Word spoken for a leading minus sign in digit-by-digit mode.
    pub number_minus: String,
    pub digits: [String; 10],
    /// Word spoken before a capital letter by `@caps`.
    pub cap: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            language_name: None,
            pause_short: ",".to_string(),
            pause_medium: ";".to_string(),
            pause_long: ".".to_string(),
            number_group: ",".to_string(),
            number_decimal: ".".to_string(),
            number_point: "point".to_string(),
            number_minus: "negative".to_string(),
            digits: [
                "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine",
            ]
            .map(String::from),
            cap: "cap".to_string(),
        }
    }
}

impl Settings {
    pub fn is_known_directive(name: &str) -> bool {
        KNOWN_DIRECTIVES.contains(&name)
    }

    /// Apply one directive, overriding any earlier value.
    pub fn apply(&mut self, directive: &Directive) {
        let value = directive.value.clone();
        match directive.name.as_str() {
            "language.name" => self.language_name = Some(value),
            "pause.short" => self.pause_short = value,
            "pause.medium" => self.pause_medium = value,
            "pause.long" => self.pause_long = value,
            "number.group" => self.number_group = value,
            "number.decimal" => self.number_decimal = value,
            "number.point" => self.number_point = value,
            "number.minus" => self.number_minus = value,
            "cap" => self.cap = value,
            name => {
                let digit = name
                    .strip_prefix("digit.")
                    .and_then(|d| d.parse::<usize>().ok());
                if let Some(slot) = digit.and_then(|d| self.digits.get_mut(d)) {
                    *slot = value;
                }
            }
        }
    }

    /// Punctuation for a pause of the given strength.
    pub fn pause(&self, strength: PauseStrength) -> &str {
        match strength {
            PauseStrength::Short => &self.pause_short,
            PauseStrength::Medium => &self.pause_medium,
            PauseStrength::Long => &self.pause_long,
        }
    }

    /// Word for an ASCII digit, if `c` is one.
    pub fn digit(&self, c: char) -> Option<&str> {
        let index = usize::try_from(c.to_digit(10)?).ok()?;
        self.digits.get(index).map(String::as_str)
    }
}
