//! "Did you mean" suggestions for misspelled names.

use strsim::levenshtein;

/// Compute names similar to `name` from the available options.
///
/// Allows an edit distance of 1 for names of three characters or fewer and 2
/// otherwise. Returns at most three suggestions, closest first.
pub fn compute_suggestions<S: AsRef<str>>(name: &str, available: &[S]) -> Vec<String> {
    let max_distance = if name.chars().count() <= 3 { 1 } else { 2 };
    let mut scored: Vec<(usize, &str)> = available
        .iter()
        .map(AsRef::as_ref)
        .filter(|candidate| *candidate != name)
        .map(|candidate| (levenshtein(name, candidate), candidate))
        .filter(|(distance, _)| *distance <= max_distance)
        .collect();
    scored.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));
    scored
        .into_iter()
        .take(3)
        .map(|(_, candidate)| candidate.to_string())
        .collect()
}
