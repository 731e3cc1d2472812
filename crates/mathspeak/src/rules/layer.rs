//! Rule layers and the rules they own.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::markup::{KNOWN_KINDS, NodeKind, UNKNOWN_KIND};
use crate::parser::{
    ChildTest, Condition, Directive, Item, KindPattern, Pattern, RuleDefinition, SiblingTest,
    Template,
};
use crate::rules::error::with_suggestions;
use crate::rules::{KNOWN_DIRECTIVES, LoadError, Settings};
use crate::speech::TransformRegistry;
use crate::suggest::compute_suggestions;

/// Where a layer sits in the override stack.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LayerKind {
    /// Rules shared by every language.
    Base,
    /// Overrides for one language directory.
    Language(String),
    /// Overrides for one speech style of a language.
    Style { language: String, style: String },
}

impl LayerKind {
    /// Higher layers win over lower ones.
    pub fn precedence(&self) -> u8 {
        match self {
            LayerKind::Base => 0,
            LayerKind::Language(_) => 1,
            LayerKind::Style { .. } => 2,
        }
    }
}

impl Display for LayerKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            LayerKind::Base => f.write_str("base"),
            LayerKind::Language(language) => write!(f, "{language}"),
            LayerKind::Style { language, style } => write!(f, "{language}/{style}"),
        }
    }
}

/// A validated rule ready for matching.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub name: String,
    pub pattern: Pattern,
    pub priority: i32,
    pub template: Template,
    pub layer: LayerKind,
    /// Declaration position within the layer.
    pub order: usize,
    /// 1-based source line.
    pub line: usize,
}

impl Rule {
    /// Specificity plus explicit priority.
    pub fn score(&self) -> i32 {
        self.pattern.specificity() + self.priority
    }

    /// The kind name the rule is indexed under, `*` for wildcards.
    pub fn kind(&self) -> &str {
        self.pattern.kind.as_str()
    }
}

/// One parsed and validated rule file.
#[derive(Debug, Clone)]
pub struct Layer {
    kind: LayerKind,
    origin: PathBuf,
    rules: Vec<Rule>,
    directives: Vec<Directive>,
}

impl Layer {
    /// Validate parsed items and build a layer.
    ///
    /// Rejects unknown node kinds, child names, transforms and directives,
    /// duplicate rule names, and ambiguous rule pairs.
    pub fn from_items(
        kind: LayerKind,
        origin: &Path,
        items: Vec<Item>,
    ) -> Result<Layer, LoadError> {
        let transforms = TransformRegistry::new();
        let mut rules: Vec<Rule> = Vec::new();
        let mut directives = Vec::new();
        let mut names: BTreeMap<String, usize> = BTreeMap::new();

        for item in items {
            match item {
                Item::Directive(directive) => {
                    validate_directive(&kind, origin, &directive)?;
                    directives.push(directive);
                }
                Item::Rule(definition) => {
                    validate_rule(origin, &definition, &transforms)?;
                    if let Some(first_line) = names.get(&definition.name) {
                        return Err(LoadError::invalid(
                            origin,
                            definition.line,
                            format!(
                                "duplicate rule name '{}', first defined on line {first_line}",
                                definition.name
                            ),
                        ));
                    }
                    names.insert(definition.name.clone(), definition.line);
                    rules.push(Rule {
                        name: definition.name,
                        pattern: definition.pattern,
                        priority: definition.priority,
                        template: definition.template,
                        layer: kind.clone(),
                        order: rules.len(),
                        line: definition.line,
                    });
                }
            }
        }

        check_ambiguity(origin, &rules)?;
        debug!(
            layer = %kind,
            rules = rules.len(),
            directives = directives.len(),
            "loaded rule layer"
        );

        Ok(Layer {
            kind,
            origin: origin.to_path_buf(),
            rules,
            directives,
        })
    }

    pub fn kind(&self) -> &LayerKind {
        &self.kind
    }

    pub fn origin(&self) -> &Path {
        &self.origin
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Value of a directive declared in this layer.
    pub fn directive(&self, name: &str) -> Option<&str> {
        self.directives
            .iter()
            .rev()
            .find(|directive| directive.name == name)
            .map(|directive| directive.value.as_str())
    }

    /// Override `settings` with this layer's directives.
    pub fn apply_settings(&self, settings: &mut Settings) {
        for directive in &self.directives {
            settings.apply(directive);
        }
    }
}

fn validate_directive(
    kind: &LayerKind,
    origin: &Path,
    directive: &Directive,
) -> Result<(), LoadError> {
    if !Settings::is_known_directive(&directive.name) {
        let known: Vec<&str> = KNOWN_DIRECTIVES.to_vec();
        return Err(LoadError::invalid(
            origin,
            directive.line,
            with_suggestions(
                format!("unknown directive '@{}'", directive.name),
                &compute_suggestions(&directive.name, &known),
            ),
        ));
    }
    if directive.name == "version" {
        if *kind != LayerKind::Base {
            return Err(LoadError::invalid(
                origin,
                directive.line,
                "'@version' may only be declared in base.rules",
            ));
        }
        if !is_valid_version(&directive.value) {
            return Err(LoadError::invalid(
                origin,
                directive.line,
                format!(
                    "malformed version '{}', expected at least three numeric components",
                    directive.value
                ),
            ));
        }
    }
    Ok(())
}

/// At least three dot-separated numeric components: `1.2.3`, `0.4.0.1`.
pub(crate) fn is_valid_version(version: &str) -> bool {
    let parts: Vec<&str> = version.split('.').collect();
    parts.len() >= 3
        && parts
            .iter()
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()))
}

fn validate_rule(
    origin: &Path,
    definition: &RuleDefinition,
    transforms: &TransformRegistry,
) -> Result<(), LoadError> {
    let line = definition.line;
    let kind_name = definition.pattern.kind.as_str();
    if let KindPattern::Named(name) = &definition.pattern.kind {
        validate_kind(origin, line, name)?;
    }

    let allowed = NodeKind::child_names_for(kind_name);
    for condition in &definition.pattern.conditions {
        validate_condition(origin, line, condition, allowed.as_deref())?;
    }
    for name in definition.template.child_references() {
        validate_child_name(origin, line, name, allowed.as_deref())?;
    }
    for transform in definition.template.transforms() {
        if !transforms.has_transform(&transform.name) {
            return Err(LoadError::invalid(
                origin,
                line,
                with_suggestions(
                    format!("unknown transform '@{}'", transform.name),
                    &compute_suggestions(&transform.name, &transforms.names()),
                ),
            ));
        }
    }
    Ok(())
}

fn validate_condition(
    origin: &Path,
    line: usize,
    condition: &Condition,
    allowed: Option<&[&'static str]>,
) -> Result<(), LoadError> {
    match condition {
        Condition::Parent(kind)
        | Condition::Next(SiblingTest::Kind(kind))
        | Condition::Prev(SiblingTest::Kind(kind)) => validate_kind(origin, line, kind),
        Condition::Child { name, test } => {
            validate_child_name(origin, line, name, allowed)?;
            match test {
                ChildTest::Kind(kind) => validate_kind(origin, line, kind),
                ChildTest::Text(_) => Ok(()),
            }
        }
        Condition::Not(inner) => validate_condition(origin, line, inner, allowed),
        _ => Ok(()),
    }
}

fn validate_kind(origin: &Path, line: usize, name: &str) -> Result<(), LoadError> {
    if NodeKind::is_known_name(name) {
        return Ok(());
    }
    let mut known: Vec<&str> = KNOWN_KINDS.to_vec();
    known.push(UNKNOWN_KIND);
    Err(LoadError::invalid(
        origin,
        line,
        with_suggestions(
            format!("unknown node kind '{name}'"),
            &compute_suggestions(name, &known),
        ),
    ))
}

/// Every child name any kind exposes.
fn all_child_names() -> Vec<&'static str> {
    let mut names: BTreeSet<&'static str> = BTreeSet::from(["children", "body"]);
    for kind in KNOWN_KINDS {
        names.extend(NodeKind::from_tag(kind).child_names());
    }
    names.into_iter().collect()
}

fn validate_child_name(
    origin: &Path,
    line: usize,
    name: &str,
    allowed: Option<&[&'static str]>,
) -> Result<(), LoadError> {
    if name.chars().all(|c| c.is_ascii_digit()) {
        return Ok(());
    }
    let candidates = match allowed {
        Some(allowed) => allowed.to_vec(),
        None => all_child_names(),
    };
    if candidates.contains(&name) {
        return Ok(());
    }
    Err(LoadError::invalid(
        origin,
        line,
        with_suggestions(
            format!("unknown child name '${name}'"),
            &compute_suggestions(name, &candidates),
        ),
    ))
}

/// Reject rule pairs that tie on kind, conditions and score but produce
/// different speech.
fn check_ambiguity(origin: &Path, rules: &[Rule]) -> Result<(), LoadError> {
    let mut seen: BTreeMap<(String, Vec<String>, i32), &Rule> = BTreeMap::new();
    for rule in rules {
        let key = (
            rule.kind().to_string(),
            rule.pattern.canonical_conditions(),
            rule.score(),
        );
        match seen.get(&key) {
            Some(first) if first.template != rule.template => {
                return Err(LoadError::AmbiguousRule {
                    origin: origin.to_path_buf(),
                    first: first.name.clone(),
                    second: rule.name.clone(),
                });
            }
            Some(_) => {}
            None => {
                seen.insert(key, rule);
            }
        }
    }
    Ok(())
}
