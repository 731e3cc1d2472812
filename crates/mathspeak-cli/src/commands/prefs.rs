//! Implementation of the `mathspeak prefs` command.

use mathspeak::prefs::PreferenceName;
use mathspeak::PreferenceSet;
use miette::IntoDiagnostic;
use serde::Serialize;

use crate::output::table::format_preferences_table;

/// Arguments for the prefs command.
#[derive(Debug, clap::Args)]
pub struct PrefsArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// JSON output for one preference.
#[derive(Serialize)]
struct PreferenceJson {
    name: PreferenceName,
    /// `None` for free-form values.
    allowed: Option<Vec<&'static str>>,
    default: String,
}

/// Run the prefs command.
pub fn run_prefs(args: PrefsArgs) -> miette::Result<i32> {
    let defaults = PreferenceSet::default();
    if args.json {
        let output: Vec<PreferenceJson> = defaults
            .entries()
            .into_iter()
            .map(|(name, default)| PreferenceJson {
                name,
                allowed: name.allowed_values(),
                default,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&output).into_diagnostic()?);
    } else {
        println!("{}", format_preferences_table(&defaults));
    }
    Ok(exitcode::OK)
}
