//! Implementation of the `mathspeak check` command.

use std::path::PathBuf;

use mathspeak::RulePack;
use miette::IntoDiagnostic;
use owo_colors::{OwoColorize, Stream};
use serde::Serialize;

use crate::output::load_error_report;

/// Arguments for the check command.
#[derive(Debug, clap::Args)]
pub struct CheckArgs {
    /// Rules directory to check
    pub dir: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// JSON output for check results.
#[derive(Debug, Serialize)]
struct CheckJson {
    path: String,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    languages: Vec<String>,
    layers: usize,
    rules: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Run the check command.
pub fn run_check(args: CheckArgs) -> miette::Result<i32> {
    let path = args.dir.display().to_string();
    match RulePack::load(&args.dir) {
        Ok(pack) => {
            let languages: Vec<String> = pack.languages().map(str::to_string).collect();
            let layers = pack.layers();
            let rules: usize = layers.iter().map(|layer| layer.rules().len()).sum();
            if args.json {
                let output = CheckJson {
                    path,
                    valid: true,
                    version: Some(pack.version().to_string()),
                    languages,
                    layers: layers.len(),
                    rules,
                    error: None,
                };
                println!("{}", serde_json::to_string_pretty(&output).into_diagnostic()?);
            } else {
                println!(
                    "{} {}: version {}, {} languages ({}), {} layers, {} rules",
                    "ok".if_supports_color(Stream::Stdout, |t| t.green()),
                    path,
                    pack.version(),
                    languages.len(),
                    languages.join(", "),
                    layers.len(),
                    rules
                );
            }
            Ok(exitcode::OK)
        }
        Err(e) => {
            if args.json {
                let output = CheckJson {
                    path,
                    valid: false,
                    version: None,
                    languages: Vec::new(),
                    layers: 0,
                    rules: 0,
                    error: Some(e.to_string()),
                };
                println!("{}", serde_json::to_string_pretty(&output).into_diagnostic()?);
            } else {
                eprintln!("{:?}", load_error_report(e));
            }
            Ok(exitcode::DATAERR)
        }
    }
}
