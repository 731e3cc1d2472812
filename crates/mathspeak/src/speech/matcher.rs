//! Rule matching: pick the first applicable candidate for a node.

use tracing::trace;

use crate::markup::{ExpressionNode, NodeKind};
use crate::parser::{ChildTest, Condition};
use crate::rules::{ResolvedRules, Rule};
use crate::speech::{MatchError, RenderContext};

/// Which children a template or condition name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ChildSelector {
    /// `$children` or `$body`: every child in order.
    All,
    /// A positional or named child.
    Index(usize),
}

/// Map a child name to a selector for a node kind.
///
/// Returns `None` when the kind has no child by that name.
pub(crate) fn select_child(kind: &NodeKind, name: &str) -> Option<ChildSelector> {
    if name == "children" || (name == "body" && kind.has_body()) {
        return Some(ChildSelector::All);
    }
    if let Ok(index) = name.parse::<usize>() {
        return Some(ChildSelector::Index(index));
    }
    kind.child_names()
        .iter()
        .position(|candidate| *candidate == name)
        .map(ChildSelector::Index)
}

/// Find the rule that applies to `node`.
///
/// Candidates are scanned in their precomputed order; the first one whose
/// conditions all hold wins.
pub fn match_rule<'r>(
    node: &ExpressionNode,
    context: &RenderContext<'_>,
    rules: &'r ResolvedRules,
) -> Result<&'r Rule, MatchError> {
    let kind = node.kind().name();
    let rule = rules
        .candidates(kind)
        .iter()
        .find(|rule| {
            rule.pattern
                .conditions
                .iter()
                .all(|condition| condition_holds(condition, node, context))
        })
        .ok_or_else(|| MatchError::NoMatch {
            kind: kind.to_string(),
        })?;
    trace!(kind, rule = %rule.name, layer = %rule.layer, "matched rule");
    Ok(rule)
}

/// Evaluate one condition against a node in context.
pub fn condition_holds(
    condition: &Condition,
    node: &ExpressionNode,
    context: &RenderContext<'_>,
) -> bool {
    match condition {
        Condition::Text(text) => node.text() == Some(text.as_str()),
        Condition::Role(role) => node.operator_role() == Some(*role),
        Condition::Parent(kind) => context
            .parent()
            .is_some_and(|parent| parent.kind().name() == kind),
        Condition::Next(test) => test.matches(context.next_sibling()),
        Condition::Prev(test) => test.matches(context.previous_sibling()),
        Condition::Depth(op, n) => op.holds(context.depth(), *n),
        Condition::ChildCount(op, n) => op.holds(node.children().len(), *n),
        Condition::Verbosity(verbosity) => context.preferences().verbosity() == *verbosity,
        Condition::Attribute { name, value } => node.attribute(name) == Some(value.as_str()),
        Condition::Child { name, test } => child_test_holds(node, name, test),
        Condition::Root => context.parent().is_none(),
        Condition::Leaf => node.is_leaf(),
        Condition::First => context.is_first(),
        Condition::Last => context.is_last(),
        Condition::Not(inner) => !condition_holds(inner, node, context),
    }
}

fn child_test_holds(node: &ExpressionNode, name: &str, test: &ChildTest) -> bool {
    match select_child(node.kind(), name) {
        Some(ChildSelector::Index(index)) => node.children().get(index).is_some_and(|child| {
            match test {
                ChildTest::Text(text) => child.literal_text() == *text,
                ChildTest::Kind(kind) => child.kind().name() == kind,
            }
        }),
        Some(ChildSelector::All) => match test {
            ChildTest::Text(text) => node.leaf_texts().join(" ") == *text,
            ChildTest::Kind(kind) => match node.children() {
                [only] => only.kind().name() == kind,
                _ => false,
            },
        },
        None => false,
    }
}
