//! Rules merged for one (language, style) pair.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use crate::rules::{Layer, Rule, Settings};

/// The effective rule set for one language and speech style.
///
/// Every kind has a precomputed candidate list, ordered by layer precedence,
/// then score, then declaration order. Matching takes the first candidate
/// whose conditions hold.
#[derive(Debug)]
pub struct ResolvedRules {
    language: Option<String>,
    style: Option<String>,
    by_kind: BTreeMap<String, Vec<Rule>>,
    wildcard: Vec<Rule>,
    settings: Settings,
}

impl ResolvedRules {
    /// Merge layers, lowest precedence first.
    pub(crate) fn from_layers(
        language: Option<String>,
        style: Option<String>,
        layers: &[&Layer],
    ) -> Self {
        let mut settings = Settings::default();
        let mut by_kind: BTreeMap<String, Vec<Rule>> = BTreeMap::new();
        let mut wildcard = Vec::new();

        for layer in layers {
            layer.apply_settings(&mut settings);
            for rule in layer.rules() {
                if rule.kind() == "*" {
                    wildcard.push(rule.clone());
                } else {
                    by_kind
                        .entry(rule.kind().to_string())
                        .or_default()
                        .push(rule.clone());
                }
            }
        }

        for candidates in by_kind.values_mut() {
            candidates.extend(wildcard.iter().cloned());
            sort_candidates(candidates);
        }
        sort_candidates(&mut wildcard);

        Self {
            language,
            style,
            by_kind,
            wildcard,
            settings,
        }
    }

    /// Candidate rules for a node kind, best first.
    pub fn candidates(&self, kind: &str) -> &[Rule] {
        self.by_kind
            .get(kind)
            .map_or(self.wildcard.as_slice(), Vec::as_slice)
    }

    /// Whether any rule names this kind explicitly.
    pub fn has_specific_rule(&self, kind: &str) -> bool {
        self.by_kind.contains_key(kind)
    }

    /// Kinds with at least one kind-specific rule.
    pub fn covered_kinds(&self) -> impl Iterator<Item = &str> {
        self.by_kind.keys().map(String::as_str)
    }

    /// The language directory whose layers were used, if any.
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// The style layer that was used, if any.
    pub fn style(&self) -> Option<&str> {
        self.style.as_deref()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Total number of distinct rules in effect.
    pub fn rule_count(&self) -> usize {
        let specific: usize = self
            .by_kind
            .values()
            .map(|candidates| candidates.len() - self.wildcard.len())
            .sum();
        specific + self.wildcard.len()
    }
}

fn sort_candidates(candidates: &mut [Rule]) {
    candidates.sort_by_key(|rule| {
        (
            Reverse(rule.layer.precedence()),
            Reverse(rule.score()),
            rule.order,
        )
    });
}
