//! Spoken forms of numeric text for `{number}`.

use crate::prefs::NumericFormat;
use crate::rules::Settings;

/// A number split at its decimal mark.
struct ParsedNumber<'a> {
    sign: &'a str,
    integer: String,
    fraction: Option<&'a str>,
}

/// Split `text` into sign, integer digits and fraction digits.
///
/// Group separators in the integer part are dropped. Returns `None` when the
/// text is not a number written with `decimal` as its decimal mark.
fn parse_number<'a>(text: &'a str, decimal: &str) -> Option<ParsedNumber<'a>> {
    let (sign, unsigned) = match text.strip_prefix(['-', '\u{2212}']) {
        Some(rest) => (&text[..text.len() - rest.len()], rest),
        None => ("", text),
    };
    let (integer_part, fraction) = match unsigned.split_once(decimal) {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };

    let is_group_char = |c: char| matches!(c, ',' | '.' | ' ' | '\u{a0}' | '\u{202f}' | '\'');
    if !integer_part
        .chars()
        .all(|c| c.is_ascii_digit() || is_group_char(c))
    {
        return None;
    }
    let integer: String = integer_part.chars().filter(char::is_ascii_digit).collect();
    if integer.is_empty() && fraction.is_none() {
        return None;
    }
    if let Some(fraction) = fraction {
        if fraction.is_empty() || !fraction.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
    }
    Some(ParsedNumber {
        sign,
        integer,
        fraction,
    })
}

/// Speak numeric text according to the numeric format.
///
/// `decimal` is the decimal mark the text is written with. Text that is not
/// a number is returned unchanged.
pub fn speak_number(
    text: &str,
    format: NumericFormat,
    decimal: &str,
    settings: &Settings,
) -> String {
    let text = text.trim();
    if format == NumericFormat::Digits {
        return text.to_string();
    }
    let Some(number) = parse_number(text, decimal) else {
        return text.to_string();
    };

    match format {
        NumericFormat::Digits => text.to_string(),
        NumericFormat::Grouped => {
            let mut spoken = format!(
                "{}{}",
                number.sign,
                group_digits(&number.integer, &settings.number_group)
            );
            if let Some(fraction) = number.fraction {
                spoken.push_str(decimal);
                spoken.push_str(fraction);
            }
            spoken
        }
        NumericFormat::DigitByDigit => {
            let mut words: Vec<&str> = Vec::new();
            if !number.sign.is_empty() {
                words.push(&settings.number_minus);
            }
            words.extend(number.integer.chars().filter_map(|c| settings.digit(c)));
            if let Some(fraction) = number.fraction {
                words.push(&settings.number_point);
                words.extend(fraction.chars().filter_map(|c| settings.digit(c)));
            }
            words.join(" ")
        }
    }
}

/// Group digits in threes from the right.
fn group_digits(digits: &str, separator: &str) -> String {
    let reversed: Vec<char> = digits.chars().rev().collect();
    let mut groups: Vec<String> = reversed
        .chunks(3)
        .map(|chunk| chunk.iter().rev().collect())
        .collect();
    groups.reverse();
    groups.join(separator)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn speak(text: &str, format: NumericFormat, decimal: &str) -> String {
        speak_number(text, format, decimal, &Settings::default())
    }

    #[test]
    fn digits_are_spoken_as_written() {
        assert_eq!(speak("1234.5", NumericFormat::Digits, "."), "1234.5");
    }

    #[test]
    fn grouped_inserts_separators() {
        assert_eq!(speak("1234567", NumericFormat::Grouped, "."), "1,234,567");
        assert_eq!(speak("1234.25", NumericFormat::Grouped, "."), "1,234.25");
        assert_eq!(speak("999", NumericFormat::Grouped, "."), "999");
    }

    #[test]
    fn digit_by_digit_uses_digit_words() {
        assert_eq!(
            speak("3.14", NumericFormat::DigitByDigit, "."),
            "three point one four"
        );
    }

    #[test]
    fn digit_by_digit_speaks_the_sign() {
        assert_eq!(
            speak("-3.14", NumericFormat::DigitByDigit, "."),
            "negative three point one four"
        );
        assert_eq!(
            speak("\u{2212}7", NumericFormat::DigitByDigit, "."),
            "negative seven"
        );
        assert_eq!(speak("-1234", NumericFormat::Grouped, "."), "-1,234");
    }

    #[test]
    fn comma_decimal_mark() {
        assert_eq!(
            speak("2,5", NumericFormat::DigitByDigit, ","),
            "two point five"
        );
        assert_eq!(speak("1.234,5", NumericFormat::Grouped, ","), "1,234,5");
    }

    #[test]
    fn non_numeric_text_is_unchanged() {
        assert_eq!(speak("x", NumericFormat::Grouped, "."), "x");
        assert_eq!(speak("1.2.3", NumericFormat::DigitByDigit, "."), "1.2.3");
    }
}
