//! Orchestrator Error Types
//!
//! Every variant is recoverable at the granularity of one user action: the
//! last committed graph stays available after any of them.

use crate::persistence::PersistenceError;
use crate::store::GraphError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrchestratorError {
    /// Commit or attachment failed; the previous graph is retained
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Session persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// A concept generator or proposer failed or returned unusable data.
    /// The graph is left exactly as it was.
    #[error("External call failed: {context}")]
    ExternalCallFailure { context: String },

    /// Enrichment failed or timed out; the node stays without imagery
    #[error("Enrichment failed for node {node_id}: {reason}")]
    EnrichmentFailure { node_id: String, reason: String },

    /// Another append for the same context is still pending
    #[error("An append is already in flight for {context}")]
    AppendInFlight { context: String },

    #[error("Invalid engine configuration: {0}")]
    ConfigInvalid(String),
}

impl OrchestratorError {
    pub fn external_call_failure(context: impl Into<String>) -> Self {
        Self::ExternalCallFailure {
            context: context.into(),
        }
    }

    pub fn enrichment_failure(node_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::EnrichmentFailure {
            node_id: node_id.into(),
            reason: reason.into(),
        }
    }

    pub fn append_in_flight(context: impl Into<String>) -> Self {
        Self::AppendInFlight {
            context: context.into(),
        }
    }

    pub fn config_invalid(msg: impl Into<String>) -> Self {
        Self::ConfigInvalid(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_errors_convert() {
        let err: OrchestratorError = GraphError::EmptyGraph.into();
        assert!(matches!(err, OrchestratorError::Graph(GraphError::EmptyGraph)));
        assert_eq!(err.to_string(), "Graph error: Cannot attach to an empty graph");
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            OrchestratorError::append_in_flight("expand:n1").to_string(),
            "An append is already in flight for expand:n1"
        );
        assert_eq!(
            OrchestratorError::enrichment_failure("n1", "timed out").to_string(),
            "Enrichment failed for node n1: timed out"
        );
    }
}
