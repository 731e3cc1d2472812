//! Table formatting utilities for CLI output.

use comfy_table::{presets, ContentArrangement, Table};
use mathspeak::prefs::PreferenceName;
use mathspeak::PreferenceSet;

/// Kind coverage for one language and speech style.
pub struct StyleCoverage {
    /// Language directory (e.g., "en", "de").
    pub language: String,
    /// Speech style, or `None` for the language layer alone.
    pub style: Option<String>,
    /// Number of kinds with a kind-specific rule.
    pub covered: usize,
    /// Number of distinct rules in effect.
    pub rules: usize,
    /// Names of kinds that fall through to wildcard rules.
    pub missing: Vec<String>,
}

/// Format coverage data as an ASCII table.
pub fn format_coverage_table(kind_count: usize, coverage: &[StyleCoverage]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_BORDERS_ONLY);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Language", "Style", "Coverage", "Rules", "Missing"]);

    for entry in coverage {
        table.add_row(vec![
            entry.language.clone(),
            entry.style.clone().unwrap_or_else(|| "-".to_string()),
            format!("{}/{}", entry.covered, kind_count),
            entry.rules.to_string(),
            entry.missing.len().to_string(),
        ]);
    }

    table
}

/// Format every preference with its allowed values and default.
pub fn format_preferences_table(defaults: &PreferenceSet) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_BORDERS_ONLY);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Preference", "Allowed values", "Default"]);

    for name in PreferenceName::ALL {
        let allowed = name
            .allowed_values()
            .map_or_else(|| "any language tag".to_string(), |values| values.join(", "));
        table.add_row(vec![name.to_string(), allowed, defaults.value(name)]);
    }

    table
}
