//! Tree-to-speech rendering.
//!
//! Walks the expression tree depth-first, matches each node against the
//! resolved rules, and expands the winning template into speech fragments.
//! A subtree that cannot be rendered is spoken as its literal text instead.

use serde::Serialize;
use tracing::warn;

use crate::markup::ExpressionNode;
use crate::parser::{Segment, Transform};
use crate::prefs::PreferenceSet;
use crate::rules::{ResolvedRules, Rule};
use crate::speech::fragment::join;
use crate::speech::matcher::{ChildSelector, select_child};
use crate::speech::numbers::speak_number;
use crate::speech::{
    FragmentMarker, RenderContext, RenderError, SpeechFragment, TransformContext,
    TransformRegistry, match_rule,
};

/// A subtree that degraded to its literal text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderIssue {
    /// Kind name of the subtree root.
    pub kind: String,
    /// Depth of the subtree root; 0 is the tree root.
    pub depth: usize,
    /// Why the subtree could not be rendered.
    pub message: String,
    /// What was spoken instead.
    pub fallback: String,
}

/// The structured result of rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Speech {
    /// The joined speech text.
    pub text: String,
    pub fragments: Vec<SpeechFragment>,
    /// One entry per subtree rendered from its fallback.
    pub issues: Vec<RenderIssue>,
}

/// Render a tree to speech text.
pub fn render(
    tree: &ExpressionNode,
    rules: &ResolvedRules,
    preferences: &PreferenceSet,
) -> Result<String, RenderError> {
    render_speech(tree, rules, preferences).map(|speech| speech.text)
}

/// Render a tree, keeping the fragments and any degraded subtrees.
///
/// Fails only when nothing at all could be spoken: either the root's rule
/// failed and the tree has no leaf text, or the output is empty.
pub fn render_speech(
    tree: &ExpressionNode,
    rules: &ResolvedRules,
    preferences: &PreferenceSet,
) -> Result<Speech, RenderError> {
    let transforms = TransformRegistry::new();
    let mut renderer = Renderer {
        rules,
        transforms: &transforms,
        transform_context: TransformContext::new(preferences.language(), rules.settings()),
        issues: Vec::new(),
    };

    let context = RenderContext::root(tree, preferences);
    let fragments = match renderer.render_node(tree, &context) {
        Ok(fragments) => fragments,
        Err(error) => {
            let fallback = renderer.fallback(tree, &context, &error);
            if fallback.is_empty() {
                return Err(error);
            }
            fallback
        }
    };

    let text = join(&fragments, rules.settings());
    if text.is_empty() {
        return Err(RenderError::Empty);
    }
    Ok(Speech {
        text,
        fragments,
        issues: renderer.issues,
    })
}

struct Renderer<'a> {
    rules: &'a ResolvedRules,
    transforms: &'a TransformRegistry,
    transform_context: TransformContext<'a>,
    issues: Vec<RenderIssue>,
}

impl Renderer<'_> {
    fn render_node<'t>(
        &mut self,
        node: &'t ExpressionNode,
        context: &RenderContext<'t>,
    ) -> Result<Vec<SpeechFragment>, RenderError> {
        let rule = match_rule(node, context, self.rules)?;
        let mut fragments = Vec::new();
        for segment in &rule.template.segments {
            match segment {
                Segment::Literal(text) => {
                    let text = text.trim();
                    if !text.is_empty() {
                        fragments.push(SpeechFragment::plain(text));
                    }
                }
                Segment::Child { name, transforms } => {
                    let mut child_fragments = self.render_children(node, context, rule, name)?;
                    for fragment in &mut child_fragments {
                        if fragment.marker == FragmentMarker::Plain {
                            fragment.text = self.apply_transforms(&fragment.text, transforms)?;
                        }
                    }
                    fragments.extend(child_fragments);
                }
                Segment::Text { transforms } => {
                    let text = self.apply_transforms(&node.literal_text(), transforms)?;
                    fragments.push(SpeechFragment::plain(text));
                }
                Segment::Number => {
                    let preferences = context.preferences();
                    let settings = self.rules.settings();
                    let decimal = preferences
                        .decimal_separator()
                        .resolve(&settings.number_decimal);
                    fragments.push(SpeechFragment::plain(speak_number(
                        &node.literal_text(),
                        preferences.numeric_format(),
                        decimal,
                        settings,
                    )));
                }
                Segment::Index => {
                    fragments.push(SpeechFragment::plain((context.index() + 1).to_string()));
                }
                Segment::Count => {
                    fragments.push(SpeechFragment::plain(node.children().len().to_string()));
                }
                Segment::Pause(strength) => fragments.push(SpeechFragment::pause(*strength)),
                Segment::GroupStart => fragments.push(SpeechFragment::start_group()),
                Segment::GroupEnd { marker } => {
                    fragments.push(SpeechFragment::end_group(marker.as_deref()));
                }
            }
        }
        Ok(fragments)
    }

    /// Render the children a template reference selects.
    fn render_children<'t>(
        &mut self,
        node: &'t ExpressionNode,
        context: &RenderContext<'t>,
        rule: &Rule,
        name: &str,
    ) -> Result<Vec<SpeechFragment>, RenderError> {
        let children = node.children();
        match select_child(node.kind(), name) {
            Some(ChildSelector::All) => {
                let mut fragments = Vec::new();
                for (index, child) in children.iter().enumerate() {
                    fragments.extend(self.render_child(node, child, context, index));
                }
                Ok(fragments)
            }
            Some(ChildSelector::Index(index)) => match children.get(index) {
                Some(child) => Ok(self.render_child(node, child, context, index)),
                None => Err(RenderError::Arity {
                    kind: node.kind().name().to_string(),
                    child: name.to_string(),
                    expected: node.kind().child_names().len().max(index + 1),
                    got: children.len(),
                }),
            },
            None => Err(RenderError::UnknownChild {
                kind: node.kind().name().to_string(),
                child: name.to_string(),
                rule: rule.name.clone(),
            }),
        }
    }

    /// Render one child, speaking its literal text if its own rule fails.
    fn render_child<'t>(
        &mut self,
        parent: &'t ExpressionNode,
        child: &'t ExpressionNode,
        context: &RenderContext<'t>,
        index: usize,
    ) -> Vec<SpeechFragment> {
        let result = context
            .child(parent, index)
            .and_then(|child_context| self.render_node(child, &child_context));
        match result {
            Ok(fragments) => fragments,
            Err(error) => self.fallback_at(child, context.depth() + 1, &error),
        }
    }

    fn fallback(
        &mut self,
        node: &ExpressionNode,
        context: &RenderContext<'_>,
        error: &RenderError,
    ) -> Vec<SpeechFragment> {
        self.fallback_at(node, context.depth(), error)
    }

    /// Speak a subtree as the texts of its leaves and record the issue.
    fn fallback_at(
        &mut self,
        node: &ExpressionNode,
        depth: usize,
        error: &RenderError,
    ) -> Vec<SpeechFragment> {
        let fallback = node.leaf_texts().join(" ");
        warn!(
            kind = node.kind().name(),
            depth,
            %error,
            fallback = %fallback,
            "rendering subtree from literal text"
        );
        self.issues.push(RenderIssue {
            kind: node.kind().name().to_string(),
            depth,
            message: error.to_string(),
            fallback: fallback.clone(),
        });
        if fallback.is_empty() {
            Vec::new()
        } else {
            vec![SpeechFragment::plain(fallback)]
        }
    }

    fn apply_transforms(
        &self,
        text: &str,
        transforms: &[Transform],
    ) -> Result<String, RenderError> {
        let mut text = text.to_string();
        for transform in transforms {
            let apply = self
                .transforms
                .get(&transform.name)
                .ok_or_else(|| RenderError::UnknownTransform {
                    name: transform.name.clone(),
                })?;
            text = apply(&text, &self.transform_context);
        }
        Ok(text)
    }
}
