//! Implementation of the `mathspeak version` command.

use std::path::PathBuf;

use mathspeak::{RulePack, RULES_DIR_ENV};

use crate::output::load_error_report;

/// Arguments for the version command.
#[derive(Debug, clap::Args)]
pub struct VersionArgs {
    /// Rules directory; the built-in pack is used when unset
    #[arg(long, env = RULES_DIR_ENV)]
    pub rules: Option<PathBuf>,
}

/// Run the version command.
pub fn run_version(args: VersionArgs) -> miette::Result<i32> {
    let pack = match &args.rules {
        Some(dir) => RulePack::load(dir),
        None => RulePack::builtin(),
    }
    .map_err(load_error_report)?;
    println!("mathspeak {} (rules {})", env!("CARGO_PKG_VERSION"), pack.version());
    Ok(exitcode::OK)
}
