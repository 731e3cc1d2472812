//! Public AST types for `.rules` files and speech templates.
//!
//! These types are public to enable external tooling (checkers, coverage
//! reports, formatters).

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::Serialize;

use crate::markup::{ExpressionNode, OperatorRole};
use crate::prefs::{PreferenceValue, Verbosity};

/// One top-level item of a `.rules` file.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Directive(Directive),
    Rule(RuleDefinition),
}

/// A setting such as `@pause.short = ",";`.
#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    /// Dotted name without the `@` (e.g. "pause.short").
    pub name: String,
    pub value: String,
    /// 1-based line of the directive in its file.
    pub line: usize,
}

/// A rule: `name = pattern :priority(n) => "template";`
#[derive(Debug, Clone, PartialEq)]
pub struct RuleDefinition {
    pub name: String,
    pub pattern: Pattern,
    /// Explicit score adjustment, 0 when absent.
    pub priority: i32,
    pub template: Template,
    /// 1-based line of the rule in its file.
    pub line: usize,
}

/// What a rule matches: a node kind plus conditions on the node and its
/// surroundings.
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    pub kind: KindPattern,
    pub conditions: Vec<Condition>,
}

impl Pattern {
    /// How narrowly the pattern matches: one point per condition plus one for
    /// naming a kind.
    pub fn specificity(&self) -> i32 {
        let kind = match self.kind {
            KindPattern::Any => 0,
            KindPattern::Named(_) => 1,
        };
        kind + i32::try_from(self.conditions.len()).unwrap_or(i32::MAX - 1)
    }

    /// Conditions rendered in sorted order, so equivalent patterns compare
    /// equal regardless of how their conditions were written.
    pub fn canonical_conditions(&self) -> Vec<String> {
        let mut conditions: Vec<String> = self.conditions.iter().map(ToString::to_string).collect();
        conditions.sort();
        conditions.dedup();
        conditions
    }
}

impl Display for Pattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.kind)?;
        if !self.conditions.is_empty() {
            let conditions: Vec<String> = self.conditions.iter().map(ToString::to_string).collect();
            write!(f, "[{}]", conditions.join(", "))?;
        }
        Ok(())
    }
}

/// The node-kind part of a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KindPattern {
    /// `*`: any kind.
    Any,
    /// A MathML tag name such as `mfrac`, or `unknown`.
    Named(String),
}

impl KindPattern {
    pub fn as_str(&self) -> &str {
        match self {
            KindPattern::Any => "*",
            KindPattern::Named(name) => name,
        }
    }
}

impl Display for KindPattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// A single predicate inside a pattern's brackets.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `text = "="`
    Text(String),
    /// `role = relation`
    Role(OperatorRole),
    /// `parent = mfrac`
    Parent(String),
    /// `next = leaf`
    Next(SiblingTest),
    /// `prev = none`
    Prev(SiblingTest),
    /// `depth >= 2`
    Depth(Comparison, usize),
    /// `children = 2`
    ChildCount(Comparison, usize),
    /// `verbosity = terse`
    Verbosity(Verbosity),
    /// `@mathvariant = "bold"`
    Attribute { name: String, value: String },
    /// `$superscript.text = "2"` or `$base.kind = mi`
    Child { name: String, test: ChildTest },
    /// `root`: the node is the tree root.
    Root,
    /// `leaf`: the node has no element children.
    Leaf,
    /// `first`: the node is its parent's first child.
    First,
    /// `last`: the node is its parent's last child.
    Last,
    /// `!cond`
    Not(Box<Condition>),
}

impl Display for Condition {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Condition::Text(text) => write!(f, "text = {text:?}"),
            Condition::Role(role) => write!(f, "role = {role}"),
            Condition::Parent(kind) => write!(f, "parent = {kind}"),
            Condition::Next(test) => write!(f, "next = {test}"),
            Condition::Prev(test) => write!(f, "prev = {test}"),
            Condition::Depth(op, n) => write!(f, "depth {op} {n}"),
            Condition::ChildCount(op, n) => write!(f, "children {op} {n}"),
            Condition::Verbosity(verbosity) => {
                write!(f, "verbosity = {}", verbosity.as_str().to_lowercase())
            }
            Condition::Attribute { name, value } => write!(f, "@{name} = {value:?}"),
            Condition::Child { name, test } => write!(f, "${name}.{test}"),
            Condition::Root => f.write_str("root"),
            Condition::Leaf => f.write_str("leaf"),
            Condition::First => f.write_str("first"),
            Condition::Last => f.write_str("last"),
            Condition::Not(inner) => write!(f, "!{inner}"),
        }
    }
}

/// A test applied to a neighbouring sibling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiblingTest {
    /// The sibling exists and has no element children.
    Leaf,
    /// There is no such sibling.
    None,
    /// The sibling exists and has this kind.
    Kind(String),
}

impl SiblingTest {
    pub fn matches(&self, sibling: Option<&ExpressionNode>) -> bool {
        match (self, sibling) {
            (SiblingTest::None, sibling) => sibling.is_none(),
            (SiblingTest::Leaf, Some(node)) => node.is_leaf(),
            (SiblingTest::Kind(kind), Some(node)) => node.kind().name() == kind,
            (_, None) => false,
        }
    }
}

impl Display for SiblingTest {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            SiblingTest::Leaf => f.write_str("leaf"),
            SiblingTest::None => f.write_str("none"),
            SiblingTest::Kind(kind) => f.write_str(kind),
        }
    }
}

/// Comparison operator for numeric conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Comparison {
    pub fn holds(self, left: usize, right: usize) -> bool {
        match self {
            Comparison::Eq => left == right,
            Comparison::Lt => left < right,
            Comparison::Le => left <= right,
            Comparison::Gt => left > right,
            Comparison::Ge => left >= right,
        }
    }
}

impl Display for Comparison {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(match self {
            Comparison::Eq => "=",
            Comparison::Lt => "<",
            Comparison::Le => "<=",
            Comparison::Gt => ">",
            Comparison::Ge => ">=",
        })
    }
}

/// A test applied to a named child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildTest {
    Text(String),
    Kind(String),
}

impl Display for ChildTest {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ChildTest::Text(text) => write!(f, "text = {text:?}"),
            ChildTest::Kind(kind) => write!(f, "kind = {kind}"),
        }
    }
}

/// A parsed speech template.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub segments: Vec<Segment>,
}

impl Template {
    /// Child names referenced anywhere in the template.
    pub fn child_references(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Child { name, .. } => Some(name.as_str()),
            _ => None,
        })
    }

    /// Transforms used anywhere in the template.
    pub fn transforms(&self) -> impl Iterator<Item = &Transform> {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Child { transforms, .. } | Segment::Text { transforms } => Some(transforms),
                _ => None,
            })
            .flatten()
    }
}

/// A segment within a template.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Literal speech text.
    Literal(String),
    /// `{$numerator}`, `{$0}`, `{$children}`: rendered child speech.
    Child {
        name: String,
        transforms: Vec<Transform>,
    },
    /// `{text}`: the node's own text.
    Text { transforms: Vec<Transform> },
    /// `{number}`: the node's text spoken as a number.
    Number,
    /// `{index}`: 1-based position among siblings.
    Index,
    /// `{count}`: number of children.
    Count,
    /// `{pause}` or `{pause:medium}`.
    Pause(PauseStrength),
    /// `{begin}`: start of a spoken group.
    GroupStart,
    /// `{end}` or `{end 'end root'}`: end of a spoken group.
    GroupEnd { marker: Option<String> },
}

/// A transform applied to interpolated text (e.g. `@caps`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transform {
    /// Transform name without `@`.
    pub name: String,
}

/// How long a pause is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PauseStrength {
    Short,
    Medium,
    Long,
}

impl PauseStrength {
    pub fn from_name(name: &str) -> Option<PauseStrength> {
        match name {
            "short" => Some(PauseStrength::Short),
            "medium" => Some(PauseStrength::Medium),
            "long" => Some(PauseStrength::Long),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PauseStrength::Short => "short",
            PauseStrength::Medium => "medium",
            PauseStrength::Long => "long",
        }
    }
}
