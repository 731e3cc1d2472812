//! Render context for tracking a node's surroundings during traversal.

use std::slice;

use crate::markup::ExpressionNode;
use crate::prefs::PreferenceSet;
use crate::speech::RenderError;

/// Maximum nesting depth the renderer descends to.
pub const MAX_DEPTH: usize = 256;

/// Where a node sits in the tree, plus the preferences in effect.
///
/// The context tracks:
/// - The parent node, if any
/// - The node's siblings and its index among them
/// - Nesting depth for limiting deep recursion
/// - The preference snapshot for the whole render
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    parent: Option<&'a ExpressionNode>,
    siblings: &'a [ExpressionNode],
    index: usize,
    depth: usize,
    max_depth: usize,
    preferences: &'a PreferenceSet,
}

impl<'a> RenderContext<'a> {
    /// Context for the root of a tree.
    pub fn root(root: &'a ExpressionNode, preferences: &'a PreferenceSet) -> Self {
        Self::with_max_depth(root, preferences, MAX_DEPTH)
    }

    /// Create context with custom max depth.
    pub fn with_max_depth(
        root: &'a ExpressionNode,
        preferences: &'a PreferenceSet,
        max_depth: usize,
    ) -> Self {
        Self {
            parent: None,
            siblings: slice::from_ref(root),
            index: 0,
            depth: 0,
            max_depth,
            preferences,
        }
    }

    /// Context for the `index`th child of `parent`.
    ///
    /// Returns an error once the maximum depth is exceeded.
    pub fn child(&self, parent: &'a ExpressionNode, index: usize) -> Result<Self, RenderError> {
        if self.depth >= self.max_depth {
            return Err(RenderError::MaxDepthExceeded {
                limit: self.max_depth,
            });
        }
        Ok(Self {
            parent: Some(parent),
            siblings: parent.children(),
            index,
            depth: self.depth + 1,
            max_depth: self.max_depth,
            preferences: self.preferences,
        })
    }

    pub fn parent(&self) -> Option<&'a ExpressionNode> {
        self.parent
    }

    /// 0-based position among siblings.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn previous_sibling(&self) -> Option<&'a ExpressionNode> {
        self.index
            .checked_sub(1)
            .and_then(|index| self.siblings.get(index))
    }

    pub fn next_sibling(&self) -> Option<&'a ExpressionNode> {
        self.siblings.get(self.index + 1)
    }

    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 == self.siblings.len()
    }

    pub fn preferences(&self) -> &'a PreferenceSet {
        self.preferences
    }
}
