//! Miette diagnostics for rule pack load errors.
//!
//! Note: This module has an exception for `unused_assignments` because miette
//! derive macros read struct fields in generated code that rustc cannot track.
#![allow(unused_assignments)]

use std::fs::read_to_string;
use std::path::Path;

use mathspeak::LoadError;
use miette::{miette, Diagnostic, NamedSource, Report, SourceSpan};
use thiserror::Error;

const SUGGESTION_MARKER: &str = " (did you mean: ";

/// A miette-compatible diagnostic for a syntax error in a rule file.
///
/// Note: Fields are read by miette derive macros, not directly by code.
#[derive(Debug, Error, Diagnostic)]
#[error("syntax error: {message}")]
#[diagnostic(code(mathspeak::syntax))]
pub struct SyntaxDiagnostic {
    #[source_code]
    src: NamedSource<String>,

    #[label("error here")]
    span: SourceSpan,

    message: String,

    #[help]
    help: Option<String>,
}

impl SyntaxDiagnostic {
    /// Create a diagnostic pointing at `line:column` of `content`.
    pub fn new(path: &Path, content: &str, line: usize, column: usize, message: &str) -> Self {
        // Sum of (line_length + 1) for lines before the error line, plus column.
        let line_start = content
            .lines()
            .take(line.saturating_sub(1))
            .map(|l| l.len() + 1)
            .sum::<usize>();
        let mut offset = (line_start + column.saturating_sub(1)).min(content.len());
        while !content.is_char_boundary(offset) {
            offset -= 1;
        }

        let (message, help) = match message.split_once(SUGGESTION_MARKER) {
            Some((message, rest)) => (
                message.to_string(),
                Some(format!("did you mean: {}", rest.trim_end_matches(')'))),
            ),
            None => (message.to_string(), None),
        };

        SyntaxDiagnostic {
            src: NamedSource::new(path.display().to_string(), content.to_string()),
            span: (offset, 1).into(),
            message,
            help,
        }
    }
}

/// Turn a load error into a report, with source context when the failing
/// file can be read back.
pub fn load_error_report(err: LoadError) -> Report {
    if let LoadError::Syntax {
        origin,
        line,
        column,
        message,
    } = &err
    {
        if let Ok(content) = read_to_string(origin) {
            return SyntaxDiagnostic::new(origin, &content, *line, *column, message).into();
        }
    }
    miette!("{err}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_points_at_line_and_column() {
        let content = "a = mi => \"x\";\nb = mo => \"y\"\n";
        let diagnostic =
            SyntaxDiagnostic::new(Path::new("language.rules"), content, 2, 5, "expected ';'");
        assert_eq!(diagnostic.span.offset(), 19);
        assert_eq!(diagnostic.message, "expected ';'");
        assert!(diagnostic.help.is_none());
    }

    #[test]
    fn suggestions_move_to_help() {
        let diagnostic = SyntaxDiagnostic::new(
            Path::new("base.rules"),
            "f = mfarc => \"\";",
            1,
            1,
            "unknown kind 'mfarc' (did you mean: mfrac?)",
        );
        assert_eq!(diagnostic.message, "unknown kind 'mfarc'");
        assert_eq!(diagnostic.help.as_deref(), Some("did you mean: mfrac?"));
    }

    #[test]
    fn offset_is_clamped_to_content() {
        let diagnostic = SyntaxDiagnostic::new(Path::new("x.rules"), "ab", 9, 9, "eof");
        assert_eq!(diagnostic.span.offset(), 2);
    }
}
