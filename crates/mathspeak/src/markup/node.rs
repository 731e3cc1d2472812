//! Expression tree types produced by the markup parser.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// The kind of a MathML element.
///
/// Every element name the engine understands has its own variant. Anything
/// else is kept as [`NodeKind::Unknown`] with the original tag name so that
/// rendering can degrade instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Math,
    Identifier,
    Number,
    Operator,
    Text,
    StringLiteral,
    Space,
    Row,
    Fraction,
    Sqrt,
    Root,
    Superscript,
    Subscript,
    SubSuperscript,
    Under,
    Over,
    UnderOver,
    Fenced,
    Table,
    TableRow,
    TableCell,
    Style,
    Padded,
    Phantom,
    Error,
    Semantics,
    Annotation,
    AnnotationXml,
    Unknown(String),
}

/// Tag names of all known kinds, in declaration order.
pub const KNOWN_KINDS: &[&str] = &[
    "math",
    "mi",
    "mn",
    "mo",
    "mtext",
    "ms",
    "mspace",
    "mrow",
    "mfrac",
    "msqrt",
    "mroot",
    "msup",
    "msub",
    "msubsup",
    "munder",
    "mover",
    "munderover",
    "mfenced",
    "mtable",
    "mtr",
    "mtd",
    "mstyle",
    "mpadded",
    "mphantom",
    "merror",
    "semantics",
    "annotation",
    "annotation-xml",
];

/// Rule key shared by every unknown element.
pub const UNKNOWN_KIND: &str = "unknown";

impl NodeKind {
    /// Map a (namespace-stripped) tag name to a kind.
    pub fn from_tag(tag: &str) -> NodeKind {
        match tag {
            "math" => NodeKind::Math,
            "mi" => NodeKind::Identifier,
            "mn" => NodeKind::Number,
            "mo" => NodeKind::Operator,
            "mtext" => NodeKind::Text,
            "ms" => NodeKind::StringLiteral,
            "mspace" => NodeKind::Space,
            "mrow" => NodeKind::Row,
            "mfrac" => NodeKind::Fraction,
            "msqrt" => NodeKind::Sqrt,
            "mroot" => NodeKind::Root,
            "msup" => NodeKind::Superscript,
            "msub" => NodeKind::Subscript,
            "msubsup" => NodeKind::SubSuperscript,
            "munder" => NodeKind::Under,
            "mover" => NodeKind::Over,
            "munderover" => NodeKind::UnderOver,
            "mfenced" => NodeKind::Fenced,
            "mtable" => NodeKind::Table,
            "mtr" => NodeKind::TableRow,
            "mtd" => NodeKind::TableCell,
            "mstyle" => NodeKind::Style,
            "mpadded" => NodeKind::Padded,
            "mphantom" => NodeKind::Phantom,
            "merror" => NodeKind::Error,
            "semantics" => NodeKind::Semantics,
            "annotation" => NodeKind::Annotation,
            "annotation-xml" => NodeKind::AnnotationXml,
            other => NodeKind::Unknown(other.to_string()),
        }
    }

    /// The name rules use to refer to this kind.
    ///
    /// Unknown elements all share the `unknown` key.
    pub fn name(&self) -> &str {
        match self {
            NodeKind::Math => "math",
            NodeKind::Identifier => "mi",
            NodeKind::Number => "mn",
            NodeKind::Operator => "mo",
            NodeKind::Text => "mtext",
            NodeKind::StringLiteral => "ms",
            NodeKind::Space => "mspace",
            NodeKind::Row => "mrow",
            NodeKind::Fraction => "mfrac",
            NodeKind::Sqrt => "msqrt",
            NodeKind::Root => "mroot",
            NodeKind::Superscript => "msup",
            NodeKind::Subscript => "msub",
            NodeKind::SubSuperscript => "msubsup",
            NodeKind::Under => "munder",
            NodeKind::Over => "mover",
            NodeKind::UnderOver => "munderover",
            NodeKind::Fenced => "mfenced",
            NodeKind::Table => "mtable",
            NodeKind::TableRow => "mtr",
            NodeKind::TableCell => "mtd",
            NodeKind::Style => "mstyle",
            NodeKind::Padded => "mpadded",
            NodeKind::Phantom => "mphantom",
            NodeKind::Error => "merror",
            NodeKind::Semantics => "semantics",
            NodeKind::Annotation => "annotation",
            NodeKind::AnnotationXml => "annotation-xml",
            NodeKind::Unknown(_) => UNKNOWN_KIND,
        }
    }

    /// Whether a rule pattern may name this kind.
    pub fn is_known_name(name: &str) -> bool {
        name == UNKNOWN_KIND || KNOWN_KINDS.contains(&name)
    }

    /// Token elements carry text instead of element children.
    pub fn is_token(&self) -> bool {
        matches!(
            self,
            NodeKind::Identifier
                | NodeKind::Number
                | NodeKind::Operator
                | NodeKind::Text
                | NodeKind::StringLiteral
                | NodeKind::Space
                | NodeKind::Annotation
        )
    }

    /// Names of the children this kind exposes to templates, in child order.
    ///
    /// An empty slice means the kind has no fixed arity; templates can still
    /// use `$children` and positional references.
    pub fn child_names(&self) -> &'static [&'static str] {
        match self {
            NodeKind::Fraction => &["numerator", "denominator"],
            NodeKind::Root => &["base", "index"],
            NodeKind::Superscript => &["base", "superscript"],
            NodeKind::Subscript => &["base", "subscript"],
            NodeKind::SubSuperscript => &["base", "subscript", "superscript"],
            NodeKind::Under => &["base", "underscript"],
            NodeKind::Over => &["base", "overscript"],
            NodeKind::UnderOver => &["base", "underscript", "overscript"],
            _ => &[],
        }
    }

    /// Whether the kind treats all of its children as one implied row
    /// reachable as `$body`.
    pub fn has_body(&self) -> bool {
        matches!(
            self,
            NodeKind::Sqrt
                | NodeKind::Style
                | NodeKind::Padded
                | NodeKind::Phantom
                | NodeKind::Error
                | NodeKind::TableCell
                | NodeKind::Math
                | NodeKind::Row
                | NodeKind::Fenced
        )
    }

    /// Child names a template may reference for the kind with this rule name.
    ///
    /// Returns `None` for `*` and `unknown`, which accept any child name.
    pub fn child_names_for(name: &str) -> Option<Vec<&'static str>> {
        if name == "*" || name == UNKNOWN_KIND {
            return None;
        }
        let kind = NodeKind::from_tag(name);
        let mut names = vec!["children"];
        names.extend_from_slice(kind.child_names());
        if kind.has_body() {
            names.push("body");
        }
        Some(names)
    }
}

impl Display for NodeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            NodeKind::Unknown(tag) => write!(f, "unknown <{tag}>"),
            other => write!(f, "{}", other.name()),
        }
    }
}

/// The role an operator plays, derived from its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OperatorRole {
    Relation,
    Binary,
    Fence,
    Separator,
    Other,
}

impl OperatorRole {
    pub const ALL: [OperatorRole; 5] = [
        OperatorRole::Relation,
        OperatorRole::Binary,
        OperatorRole::Fence,
        OperatorRole::Separator,
        OperatorRole::Other,
    ];

    /// Classify operator text.
    pub fn classify(text: &str) -> OperatorRole {
        match text {
            "=" | "≠" | "<" | ">" | "≤" | "≥" | "≈" | "≡" | "∼" | "≅" | "∝" | "∈" | "∉"
            | "⊂" | "⊆" | "⊃" | "⊇" | "→" | "⇒" | "⇔" | "<=" | ">=" | "!=" => {
                OperatorRole::Relation
            }
            "+" | "-" | "−" | "±" | "∓" | "×" | "·" | "⋅" | "÷" | "/" | "*" | "∗" | "∘"
            | "∪" | "∩" | "∧" | "∨" => OperatorRole::Binary,
            "(" | ")" | "[" | "]" | "{" | "}" | "|" | "‖" | "⟨" | "⟩" | "⌈" | "⌉" | "⌊"
            | "⌋" => OperatorRole::Fence,
            "," | ";" | ":" => OperatorRole::Separator,
            _ => OperatorRole::Other,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            OperatorRole::Relation => "relation",
            OperatorRole::Binary => "binary",
            OperatorRole::Fence => "fence",
            OperatorRole::Separator => "separator",
            OperatorRole::Other => "other",
        }
    }

    pub fn from_name(name: &str) -> Option<OperatorRole> {
        OperatorRole::ALL.into_iter().find(|role| role.name() == name)
    }
}

impl Display for OperatorRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.name())
    }
}

/// One node of a parsed MathML expression tree.
///
/// Nodes are immutable once parsed. Each node owns its children, so a tree
/// is always acyclic.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionNode {
    kind: NodeKind,
    text: Option<String>,
    children: Vec<ExpressionNode>,
    attributes: BTreeMap<String, String>,
}

impl ExpressionNode {
    /// Create a container node.
    pub fn new(kind: NodeKind, children: Vec<ExpressionNode>) -> Self {
        Self {
            kind,
            text: None,
            children,
            attributes: BTreeMap::new(),
        }
    }

    /// Create a token node carrying text.
    pub fn leaf(kind: NodeKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: Some(text.into()),
            children: Vec::new(),
            attributes: BTreeMap::new(),
        }
    }

    /// Attach attributes, replacing any present.
    pub fn with_attributes(mut self, attributes: BTreeMap<String, String>) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Token text, if this node is a token element.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn children(&self) -> &[ExpressionNode] {
        &self.children
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// A node without element children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Role of an operator node; `None` for every other kind.
    pub fn operator_role(&self) -> Option<OperatorRole> {
        match (&self.kind, &self.text) {
            (NodeKind::Operator, Some(text)) => Some(OperatorRole::classify(text)),
            _ => None,
        }
    }

    /// Numeric value of a number node written with `.` as decimal mark.
    pub fn numeric_value(&self) -> Option<f64> {
        match (&self.kind, &self.text) {
            (NodeKind::Number, Some(text)) => text.replace(',', "").parse().ok(),
            _ => None,
        }
    }

    /// Texts of all leaves below (and including) this node, in document order.
    pub fn leaf_texts(&self) -> Vec<&str> {
        let mut texts = Vec::new();
        self.collect_leaf_texts(&mut texts);
        texts
    }

    fn collect_leaf_texts<'a>(&'a self, texts: &mut Vec<&'a str>) {
        if let Some(text) = self.text.as_deref() {
            if !text.is_empty() {
                texts.push(text);
            }
        }
        for child in &self.children {
            child.collect_leaf_texts(texts);
        }
    }

    /// Own text for tokens, otherwise the leaf texts joined with spaces.
    pub fn literal_text(&self) -> String {
        match &self.text {
            Some(text) => text.clone(),
            None => self.leaf_texts().join(" "),
        }
    }

    /// Number of nodes in the subtree rooted here.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(ExpressionNode::size).sum::<usize>()
    }
}
