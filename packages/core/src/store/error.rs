//! Graph Error Types
//!
//! Errors raised by the graph store and the attachment resolver. A failed
//! commit never changes the committed state.

use thiserror::Error;

/// Graph integrity and lookup errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// Commit rejected: the node/edge pair is not internally consistent
    #[error("Invalid graph: {reason}")]
    InvalidGraph { reason: String },

    /// Attachment attempted with no nodes at all
    #[error("Cannot attach to an empty graph")]
    EmptyGraph,

    /// Referenced node is not in the current graph
    #[error("Node not found: {id}")]
    NodeNotFound { id: String },
}

impl GraphError {
    /// Create an invalid graph error
    pub fn invalid_graph(reason: impl Into<String>) -> Self {
        Self::InvalidGraph {
            reason: reason.into(),
        }
    }

    /// Create a node not found error
    pub fn node_not_found(id: impl Into<String>) -> Self {
        Self::NodeNotFound { id: id.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_graph_error() {
        let err = GraphError::invalid_graph("edge 'e1' references missing target 'n9'");
        assert!(matches!(err, GraphError::InvalidGraph { .. }));
        assert_eq!(
            format!("{}", err),
            "Invalid graph: edge 'e1' references missing target 'n9'"
        );
    }

    #[test]
    fn test_empty_graph_error() {
        assert_eq!(
            format!("{}", GraphError::EmptyGraph),
            "Cannot attach to an empty graph"
        );
    }

    #[test]
    fn test_node_not_found_error() {
        let err = GraphError::node_not_found("missing-node");
        assert_eq!(format!("{}", err), "Node not found: missing-node");
    }
}
