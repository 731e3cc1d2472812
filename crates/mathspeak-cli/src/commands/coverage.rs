//! Coverage command implementation.

use std::iter::once;
use std::path::PathBuf;

use clap::Args;
use mathspeak::markup::KNOWN_KINDS;
use mathspeak::RulePack;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::output::load_error_report;
use crate::output::table::{format_coverage_table, StyleCoverage};

/// Arguments for the coverage command.
#[derive(Debug, Args)]
pub struct CoverageArgs {
    /// Rules directory to report on
    pub dir: PathBuf,

    /// Exit with non-zero code if any language or style misses a kind.
    #[arg(long)]
    pub strict: bool,

    /// Output results as JSON.
    #[arg(long)]
    pub json: bool,
}

/// JSON output format for coverage data.
#[derive(Debug, Serialize)]
struct CoverageJson {
    language: String,
    style: Option<String>,
    covered: usize,
    total: usize,
    rules: usize,
    missing: Vec<String>,
}

/// Run the coverage command.
pub fn run_coverage(args: CoverageArgs) -> Result<i32> {
    let pack = RulePack::load(&args.dir).map_err(load_error_report)?;

    // One row for each language layer alone, then one per style.
    let mut coverage_data: Vec<StyleCoverage> = Vec::new();
    for language in pack.languages() {
        let styles = pack.styles(language);
        let rows = once(None).chain(styles.into_iter().map(Some));
        for style in rows {
            let rules = pack.resolve(language, style.unwrap_or_default());
            let missing: Vec<String> = KNOWN_KINDS
                .iter()
                .filter(|kind| !rules.has_specific_rule(kind))
                .map(|kind| (*kind).to_string())
                .collect();
            let covered = rules
                .covered_kinds()
                .filter(|kind| KNOWN_KINDS.contains(kind))
                .count();
            coverage_data.push(StyleCoverage {
                language: language.to_string(),
                style: style.map(str::to_string),
                covered,
                rules: rules.rule_count(),
                missing,
            });
        }
    }

    let any_incomplete = coverage_data.iter().any(|c| !c.missing.is_empty());

    if args.json {
        let json_data: Vec<CoverageJson> = coverage_data
            .iter()
            .map(|c| CoverageJson {
                language: c.language.clone(),
                style: c.style.clone(),
                covered: c.covered,
                total: KNOWN_KINDS.len(),
                rules: c.rules,
                missing: c.missing.clone(),
            })
            .collect();

        let json_output = serde_json::to_string_pretty(&json_data).into_diagnostic()?;
        println!("{}", json_output);
    } else {
        let table = format_coverage_table(KNOWN_KINDS.len(), &coverage_data);
        println!("{}", table);

        for entry in &coverage_data {
            if !entry.missing.is_empty() {
                match &entry.style {
                    Some(style) => println!("\nMissing in {}/{}:", entry.language, style),
                    None => println!("\nMissing in {}:", entry.language),
                }
                for kind in &entry.missing {
                    println!("  - {}", kind);
                }
            }
        }
    }

    if args.strict && any_incomplete {
        Ok(exitcode::DATAERR)
    } else {
        Ok(exitcode::OK)
    }
}
