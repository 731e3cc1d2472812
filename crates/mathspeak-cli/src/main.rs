//! mathspeak CLI entry point.
//!
//! Provides command-line tools for speaking MathML and working with rule
//! packs:
//! - `mathspeak speak` - Render MathML to speech text
//! - `mathspeak check` - Validate a rules directory
//! - `mathspeak coverage` - Report kind coverage per language and style

mod commands;
mod output;

use std::io::stderr;
use std::process::exit;

use clap::{Parser, Subcommand, ValueEnum};
use commands::{
    run_check, run_coverage, run_prefs, run_speak, run_version, CheckArgs, CoverageArgs,
    PrefsArgs, SpeakArgs, VersionArgs,
};
use tracing_subscriber::EnvFilter;

/// MathML to speech tools.
#[derive(Debug, Parser)]
#[command(name = "mathspeak")]
#[command(about = "MathML to speech tools", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Color output control
    #[arg(long, value_enum, default_value_t = ColorWhen::Auto, global = true)]
    pub color: ColorWhen,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// When to use colored output.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorWhen {
    Auto,
    Always,
    Never,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Speak a MathML expression
    Speak(SpeakArgs),
    /// Check a rules directory for errors
    Check(CheckArgs),
    /// Report which MathML kinds each language and style covers
    Coverage(CoverageArgs),
    /// List preferences, allowed values and defaults
    Prefs(PrefsArgs),
    /// Print the rule pack version
    Version(VersionArgs),
}

/// Set up color output based on user preference.
fn setup_colors(color_when: ColorWhen) {
    match color_when {
        ColorWhen::Auto => {
            // owo-colors automatically checks TTY, NO_COLOR, FORCE_COLOR
        }
        ColorWhen::Always => {
            owo_colors::set_override(true);
        }
        ColorWhen::Never => {
            owo_colors::set_override(false);
        }
    }
}

/// Log to stderr. `RUST_LOG` wins over `--verbose`.
fn setup_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(stderr)
        .with_target(false)
        .init();
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    setup_colors(cli.color);
    setup_logging(cli.verbose);

    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))?;

    let result = match cli.command {
        Commands::Speak(args) => run_speak(args),
        Commands::Check(args) => run_check(args),
        Commands::Coverage(args) => run_coverage(args),
        Commands::Prefs(args) => run_prefs(args),
        Commands::Version(args) => run_version(args),
    };

    match result {
        Ok(code) => exit(code),
        Err(e) => {
            eprintln!("{:?}", e);
            exit(exitcode::SOFTWARE);
        }
    }
}
