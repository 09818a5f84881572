//! Edges and committed graph snapshots

use super::node::Node;
use serde::{Deserialize, Serialize};

/// Directed parent → child link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    /// Parent node id
    pub source: String,
    /// Child node id
    pub target: String,
}

impl Edge {
    /// Create an edge whose id is derived from its endpoints (`e-{source}-{target}`)
    pub fn between(source: impl Into<String>, target: impl Into<String>) -> Self {
        let source = source.into();
        let target = target.into();
        Self {
            id: format!("e-{}-{}", source, target),
            source,
            target,
        }
    }
}

/// Immutable copy of the committed graph.
///
/// Handed out by the store for rendering and persistence. `revision` is
/// bumped on every successful commit (enrichment updates leave it alone).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSnapshot {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub revision: u64,
}

impl GraphSnapshot {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn root(&self) -> Option<&Node> {
        self.nodes.iter().find(|n| n.is_root)
    }

    /// Children of `id` in edge-insertion order
    pub fn children_of(&self, id: &str) -> Vec<&Node> {
        self.edges
            .iter()
            .filter(|e| e.source == id)
            .filter_map(|e| self.node(&e.target))
            .collect()
    }

    pub fn parent_of(&self, id: &str) -> Option<&Node> {
        self.edges
            .iter()
            .find(|e| e.target == id)
            .and_then(|e| self.node(&e.source))
    }

    pub fn labels(&self) -> Vec<String> {
        self.nodes.iter().map(|n| n.label.clone()).collect()
    }
}
