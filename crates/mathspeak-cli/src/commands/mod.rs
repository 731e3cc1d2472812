//! CLI command implementations.

mod check;
mod coverage;
mod prefs;
mod speak;
mod version;

pub use check::{run_check, CheckArgs};
pub use coverage::{run_coverage, CoverageArgs};
pub use prefs::{run_prefs, PrefsArgs};
pub use speak::{run_speak, SpeakArgs};
pub use version::{run_version, VersionArgs};
