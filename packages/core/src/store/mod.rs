//! Graph Store
//!
//! The authoritative in-memory node/edge state of one mind map.
//!
//! # Architecture
//!
//! - **Copy-on-commit**: the committed graph lives behind an `Arc`; readers
//!   get the `Arc` and never observe a half-applied commit
//! - **Single entry point**: `commit` (and its merging variant) replace both
//!   collections at once after validation; a rejected commit leaves the
//!   previous state untouched
//! - **Narrow visual updates**: enrichment patches one node's image state in
//!   place without bumping the revision
//! - **Domain events**: every visible change is broadcast after it lands
//!
//! The store is an explicitly owned container. The orchestrator holds it in
//! an `Arc` and is the only writer of node/edge sets.

mod error;
pub mod events;
mod validation;

pub use error::GraphError;
pub use events::GraphEvent;
pub use validation::validate_graph;

use crate::models::{Edge, GraphSnapshot, Node, VisualUpdate};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::broadcast;

/// Default broadcast capacity for graph events.
///
/// Bulk expansions emit a handful of events; subscribers only care about the
/// latest state, so lag is tolerable.
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 128;

pub struct GraphStore {
    current: RwLock<Arc<GraphSnapshot>>,
    events: broadcast::Sender<GraphEvent>,
}

impl GraphStore {
    pub fn new(event_capacity: usize) -> Self {
        let (events, _) = broadcast::channel(event_capacity.max(1));
        Self {
            current: RwLock::new(Arc::new(GraphSnapshot::default())),
            events,
        }
    }

    /// Immutable copy of the committed graph
    pub fn snapshot(&self) -> Arc<GraphSnapshot> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Subscribe to graph events
    pub fn subscribe(&self) -> broadcast::Receiver<GraphEvent> {
        self.events.subscribe()
    }

    /// Atomically replace the node and edge sets.
    ///
    /// Returns the new revision. Fails with `InvalidGraph` (state unchanged)
    /// when the pair violates any integrity rule.
    pub fn commit(&self, nodes: Vec<Node>, edges: Vec<Edge>) -> Result<u64, GraphError> {
        self.replace(nodes, edges, false)
    }

    /// Replace the node and edge sets, keeping the current visual state of
    /// every node that already exists.
    ///
    /// Used by append cycles: the incoming nodes were copied from an older
    /// snapshot, so an enrichment that landed in the meantime must win over
    /// the stale copy.
    pub fn commit_merging_visuals(
        &self,
        nodes: Vec<Node>,
        edges: Vec<Edge>,
    ) -> Result<u64, GraphError> {
        self.replace(nodes, edges, true)
    }

    fn replace(
        &self,
        mut nodes: Vec<Node>,
        edges: Vec<Edge>,
        merge_visuals: bool,
    ) -> Result<u64, GraphError> {
        if let Err(err) = validate_graph(&nodes, &edges) {
            tracing::warn!("Rejected graph commit: {}", err);
            return Err(err);
        }

        let committed = {
            let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);

            if merge_visuals {
                let existing: HashMap<&str, &Node> =
                    guard.nodes.iter().map(|n| (n.id.as_str(), n)).collect();
                for node in nodes.iter_mut() {
                    if let Some(current) = existing.get(node.id.as_str()) {
                        node.apply_visual(&current.visual());
                    }
                }
            }

            let revision = guard.revision + 1;
            *guard = Arc::new(GraphSnapshot {
                nodes,
                edges,
                revision,
            });
            guard.clone()
        };

        tracing::debug!(
            "Committed graph revision {} ({} nodes, {} edges)",
            committed.revision,
            committed.nodes.len(),
            committed.edges.len()
        );
        let _ = self.events.send(GraphEvent::GraphCommitted {
            revision: committed.revision,
            node_count: committed.nodes.len(),
            edge_count: committed.edges.len(),
        });

        Ok(committed.revision)
    }

    /// Reset to an empty graph
    pub fn clear(&self) -> u64 {
        let revision = {
            let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
            let revision = guard.revision + 1;
            *guard = Arc::new(GraphSnapshot {
                nodes: Vec::new(),
                edges: Vec::new(),
                revision,
            });
            revision
        };

        tracing::debug!("Cleared graph (revision {})", revision);
        let _ = self.events.send(GraphEvent::GraphCleared { revision });
        revision
    }

    /// Patch the image state of a single node in place.
    ///
    /// Never changes positions, counts, or the revision. Returns `false` when
    /// the node is no longer part of the graph.
    pub fn apply_visual(&self, node_id: &str, update: &VisualUpdate) -> bool {
        {
            let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
            let Some(index) = guard.nodes.iter().position(|n| n.id == node_id) else {
                return false;
            };
            let mut next = GraphSnapshot::clone(&guard);
            next.nodes[index].apply_visual(update);
            *guard = Arc::new(next);
        }

        let _ = self.events.send(GraphEvent::NodeVisualUpdated {
            node_id: node_id.to_string(),
        });
        true
    }

    /// Broadcast an event on behalf of a collaborator sharing this store
    pub(crate) fn emit(&self, event: GraphEvent) {
        let _ = self.events.send(event);
    }
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CHANNEL_CAPACITY)
    }
}
