//! Implementation of the `mathspeak speak` command.

use std::io::{read_to_string, stderr, stdin, stdout, Write};
use std::path::PathBuf;

use mathspeak::{Engine, Speech, SpeechError, RULES_DIR_ENV};
use miette::{miette, IntoDiagnostic};
use owo_colors::{OwoColorize, Stream};
use serde::Serialize;
use tracing::debug;

use crate::output::load_error_report;

/// Arguments for the speak command.
#[derive(Debug, clap::Args)]
pub struct SpeakArgs {
    /// MathML markup, or `-` to read it from standard input
    pub markup: String,

    /// Rules directory; the built-in pack is used when unset
    #[arg(long, env = RULES_DIR_ENV)]
    pub rules: Option<PathBuf>,

    /// Language code (e.g., en, de)
    #[arg(long)]
    pub lang: Option<String>,

    /// Speech style (e.g., ClearSpeak, SimpleSpeak)
    #[arg(long)]
    pub style: Option<String>,

    /// Preferences in Name=Value format (repeatable)
    #[arg(short = 'p', long = "pref", value_parser = parse_key_val)]
    pub prefs: Vec<(String, String)>,

    /// Output fragments and issues as JSON
    #[arg(long)]
    pub json: bool,
}

/// JSON output for render failures.
#[derive(Serialize)]
struct SpeakError {
    error: String,
}

/// Parse a key=value preference string.
fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid preference format '{}': expected Name=Value", s))?;
    Ok((key.trim().to_string(), value.trim().to_string()))
}

/// Run the speak command.
pub fn run_speak(args: SpeakArgs) -> miette::Result<i32> {
    let engine = match &args.rules {
        Some(dir) => Engine::with_rules_dir(dir),
        None => Engine::builtin(),
    }
    .map_err(load_error_report)?;

    let mut updates = Vec::new();
    if let Some(lang) = &args.lang {
        updates.push(("Language", lang.as_str()));
    }
    if let Some(style) = &args.style {
        updates.push(("SpeechStyle", style.as_str()));
    }
    updates.extend(args.prefs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    for (name, value) in updates {
        if let Err(e) = engine.set_preference(name, value) {
            eprintln!("{}: {}", "error".if_supports_color(Stream::Stderr, |t| t.red()), e);
            return Ok(exitcode::USAGE);
        }
    }

    let markup = if args.markup == "-" {
        read_to_string(stdin())
            .into_diagnostic()
            .map_err(|e| miette!("Cannot read markup from standard input: {}", e))?
    } else {
        args.markup
    };

    let preferences = engine.preferences();
    debug!(
        language = %preferences.language(),
        style = %preferences.speech_style(),
        "speaking markup"
    );
    report(
        engine.render(&markup, &preferences),
        args.json,
        &mut stdout().lock(),
        &mut stderr().lock(),
    )
}

/// Write a render result. With `json`, success and failure both go to `out`.
fn report(
    result: Result<Speech, SpeechError>,
    json: bool,
    out: &mut impl Write,
    err: &mut impl Write,
) -> miette::Result<i32> {
    match result {
        Ok(speech) => {
            if json {
                let output = serde_json::to_string_pretty(&speech).into_diagnostic()?;
                writeln!(out, "{}", output).into_diagnostic()?;
            } else {
                writeln!(out, "{}", speech.text).into_diagnostic()?;
                for issue in &speech.issues {
                    writeln!(
                        err,
                        "{}: {} at depth {} spoken as '{}': {}",
                        "warning".if_supports_color(Stream::Stderr, |t| t.yellow()),
                        issue.kind,
                        issue.depth,
                        issue.fallback,
                        issue.message
                    )
                    .into_diagnostic()?;
                }
            }
            Ok(exitcode::OK)
        }
        Err(e) => {
            if json {
                let output = SpeakError {
                    error: e.to_string(),
                };
                let output = serde_json::to_string_pretty(&output).into_diagnostic()?;
                writeln!(out, "{}", output).into_diagnostic()?;
            } else {
                writeln!(
                    err,
                    "{}: {}",
                    "error".if_supports_color(Stream::Stderr, |t| t.red()),
                    e
                )
                .into_diagnostic()?;
            }
            Ok(exitcode::DATAERR)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_val_splits_on_first_equals() {
        assert_eq!(
            parse_key_val("Verbosity=Terse").unwrap(),
            ("Verbosity".to_string(), "Terse".to_string())
        );
        assert_eq!(
            parse_key_val(" Language = de ").unwrap(),
            ("Language".to_string(), "de".to_string())
        );
    }

    #[test]
    fn key_val_requires_equals() {
        let err = parse_key_val("Verbosity").unwrap_err();
        assert!(err.contains("expected Name=Value"));
    }

    #[test]
    fn json_failures_go_to_stdout() {
        let (mut out, mut err) = (Vec::new(), Vec::new());
        let code = report(Err(SpeechError::NotInitialized), true, &mut out, &mut err).unwrap();
        assert_eq!(code, exitcode::DATAERR);
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("\"error\""), "stdout: {out}");
        assert!(err.is_empty());
    }

    #[test]
    fn json_success_goes_to_stdout() {
        let speech = Speech {
            text: "x".to_string(),
            fragments: Vec::new(),
            issues: Vec::new(),
        };
        let (mut out, mut err) = (Vec::new(), Vec::new());
        let code = report(Ok(speech), true, &mut out, &mut err).unwrap();
        assert_eq!(code, exitcode::OK);
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("\"text\": \"x\""), "stdout: {out}");
        assert!(err.is_empty());
    }

    #[test]
    fn plain_failures_go_to_stderr() {
        let (mut out, mut err) = (Vec::new(), Vec::new());
        let code = report(Err(SpeechError::NotInitialized), false, &mut out, &mut err).unwrap();
        assert_eq!(code, exitcode::DATAERR);
        assert!(out.is_empty());
        assert!(!err.is_empty());
    }
}
