//! Domain Events for the Graph Store
//!
//! Events are emitted over a tokio broadcast channel whenever the committed
//! graph or a node's visual state changes, and whenever the orchestrator's
//! pipeline moves between states. Rendering surfaces subscribe instead of
//! polling the store.
//!
//! # Event Flow
//!
//! 1. The store (or orchestrator) finishes a state change
//! 2. The new state becomes visible to `snapshot()` readers
//! 3. Only then is the event broadcast
//!
//! Lagging subscribers lose old events; they only need the latest snapshot.

use crate::orchestrator::OrchestratorState;

/// Domain events emitted by the store and the orchestrator
#[derive(Debug, Clone, PartialEq)]
pub enum GraphEvent {
    /// A new node/edge set was committed
    GraphCommitted {
        revision: u64,
        node_count: usize,
        edge_count: usize,
    },

    /// The graph was reset to empty
    GraphCleared { revision: u64 },

    /// A node's image sub-state changed in place
    NodeVisualUpdated { node_id: String },

    /// Enrichment for a node failed; the node stays without imagery
    EnrichmentFailed { node_id: String, reason: String },

    /// The mutation pipeline entered a new state
    StateChanged(OrchestratorState),
}

impl GraphEvent {
    /// Get a string representation of the event type
    pub fn event_type(&self) -> &str {
        match self {
            GraphEvent::GraphCommitted { .. } => "graph:committed",
            GraphEvent::GraphCleared { .. } => "graph:cleared",
            GraphEvent::NodeVisualUpdated { .. } => "node:visual-updated",
            GraphEvent::EnrichmentFailed { .. } => "node:enrichment-failed",
            GraphEvent::StateChanged(_) => "orchestrator:state-changed",
        }
    }
}
