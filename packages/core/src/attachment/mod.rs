//! Attachment Resolver
//!
//! Decides which existing node becomes the parent of a single concept
//! proposed from chat. Bulk expansions name their parent explicitly and never
//! come through here.
//!
//! # Rules (in priority order)
//!
//! 1. A parent hint matching exactly one existing label wins
//! 2. A hint matching zero or several labels is ignored
//! 3. Otherwise the root is the parent
//! 4. Without a root, the first node is the parent
//! 5. Without any node, resolution fails with `EmptyGraph`
//!
//! Defaulting to the root keeps the tree wide and shallow: the branch that
//! was discussed last does not swallow every new concept.
//!
//! Resolution is a pure function of its inputs.

use crate::models::{Edge, Node};
use crate::store::GraphError;
use std::sync::Arc;

/// Strategy for turning a free-text parent hint into a node id.
///
/// Returns `None` when the hint does not identify exactly one node.
pub trait ParentMatcher: Send + Sync {
    fn resolve(&self, hint: &str, nodes: &[Node]) -> Option<String>;
}

impl<M: ParentMatcher + ?Sized> ParentMatcher for Arc<M> {
    fn resolve(&self, hint: &str, nodes: &[Node]) -> Option<String> {
        (**self).resolve(hint, nodes)
    }
}

/// Case-insensitive substring match against labels; unique matches only.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringMatcher;

impl ParentMatcher for SubstringMatcher {
    fn resolve(&self, hint: &str, nodes: &[Node]) -> Option<String> {
        let needle = hint.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }

        let mut matches = nodes
            .iter()
            .filter(|n| n.label.to_lowercase().contains(&needle));
        let first = matches.next()?;
        if matches.next().is_some() {
            return None;
        }
        Some(first.id.clone())
    }
}

/// Why a parent was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    HintMatched,
    Root,
    FirstNode,
}

/// Chosen parent plus the rule that picked it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedParent {
    pub parent_id: String,
    pub resolution: Resolution,
}

pub struct AttachmentResolver<M: ParentMatcher = SubstringMatcher> {
    matcher: M,
}

impl AttachmentResolver<SubstringMatcher> {
    pub fn new() -> Self {
        Self {
            matcher: SubstringMatcher,
        }
    }
}

impl Default for AttachmentResolver<SubstringMatcher> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: ParentMatcher> AttachmentResolver<M> {
    /// Use a different hint matcher
    pub fn with_matcher(matcher: M) -> Self {
        Self { matcher }
    }

    /// Pick the parent for a new single concept.
    ///
    /// `edges` are accepted so stricter strategies can weigh structure; the
    /// default rules only need the node set.
    pub fn resolve_parent(
        &self,
        label: &str,
        parent_hint: Option<&str>,
        nodes: &[Node],
        _edges: &[Edge],
    ) -> Result<ResolvedParent, GraphError> {
        if nodes.is_empty() {
            return Err(GraphError::EmptyGraph);
        }

        if let Some(hint) = parent_hint.filter(|h| !h.trim().is_empty()) {
            if let Some(parent_id) = self.matcher.resolve(hint, nodes) {
                tracing::debug!(
                    "Parent hint '{}' for '{}' matched node '{}'",
                    hint,
                    label,
                    parent_id
                );
                return Ok(ResolvedParent {
                    parent_id,
                    resolution: Resolution::HintMatched,
                });
            }
            tracing::debug!(
                "Parent hint '{}' for '{}' was missing or ambiguous, falling back to root",
                hint,
                label
            );
        }

        if let Some(root) = nodes.iter().find(|n| n.is_root) {
            return Ok(ResolvedParent {
                parent_id: root.id.clone(),
                resolution: Resolution::Root,
            });
        }

        Ok(ResolvedParent {
            parent_id: nodes[0].id.clone(),
            resolution: Resolution::FirstNode,
        })
    }
}
