//! Commit-time integrity checks
//!
//! A node/edge pair is committable when:
//!
//! - node ids are unique
//! - every edge endpoint is present in the node set
//! - no edge is a self-edge
//! - a non-empty graph has exactly one root and the root has no parent
//! - every node has at most one parent (tree shape)
//! - there are no cycles

use super::error::GraphError;
use crate::models::{Edge, Node};
use std::collections::{HashMap, HashSet};

/// Check that `nodes`/`edges` form a committable mind-map tree.
pub fn validate_graph(nodes: &[Node], edges: &[Edge]) -> Result<(), GraphError> {
    let mut ids: HashSet<&str> = HashSet::with_capacity(nodes.len());
    for node in nodes {
        if !ids.insert(node.id.as_str()) {
            return Err(GraphError::invalid_graph(format!(
                "duplicate node id '{}'",
                node.id
            )));
        }
    }

    let mut parent_of: HashMap<&str, &str> = HashMap::with_capacity(edges.len());
    for edge in edges {
        if !ids.contains(edge.source.as_str()) {
            return Err(GraphError::invalid_graph(format!(
                "edge '{}' references missing source '{}'",
                edge.id, edge.source
            )));
        }
        if !ids.contains(edge.target.as_str()) {
            return Err(GraphError::invalid_graph(format!(
                "edge '{}' references missing target '{}'",
                edge.id, edge.target
            )));
        }
        if edge.source == edge.target {
            return Err(GraphError::invalid_graph(format!(
                "edge '{}' is a self-edge on '{}'",
                edge.id, edge.source
            )));
        }
        if let Some(existing) = parent_of.insert(edge.target.as_str(), edge.source.as_str()) {
            return Err(GraphError::invalid_graph(format!(
                "node '{}' already has parent '{}'; edge '{}' would add a second",
                edge.target, existing, edge.id
            )));
        }
    }

    let roots: Vec<&Node> = nodes.iter().filter(|n| n.is_root).collect();
    match roots.as_slice() {
        [] if nodes.is_empty() => {}
        [] => return Err(GraphError::invalid_graph("non-empty graph has no root")),
        [root] => {
            if parent_of.contains_key(root.id.as_str()) {
                return Err(GraphError::invalid_graph(format!(
                    "root '{}' has an incoming edge",
                    root.id
                )));
            }
        }
        _ => {
            return Err(GraphError::invalid_graph(format!(
                "graph has {} root nodes",
                roots.len()
            )))
        }
    }

    // With at most one parent per node, anything unreachable from a
    // parentless node sits on (or under) a cycle.
    let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in edges {
        children
            .entry(edge.source.as_str())
            .or_default()
            .push(edge.target.as_str());
    }
    let mut reached: HashSet<&str> = HashSet::with_capacity(nodes.len());
    let mut stack: Vec<&str> = nodes
        .iter()
        .map(|n| n.id.as_str())
        .filter(|id| !parent_of.contains_key(id))
        .collect();
    while let Some(id) = stack.pop() {
        if reached.insert(id) {
            if let Some(kids) = children.get(id) {
                stack.extend(kids.iter().copied());
            }
        }
    }
    if reached.len() < nodes.len() {
        let stuck = nodes
            .iter()
            .find(|n| !reached.contains(n.id.as_str()))
            .map(|n| n.id.as_str())
            .unwrap_or_default();
        return Err(GraphError::invalid_graph(format!(
            "cycle detected through node '{}'",
            stuck
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, is_root: bool) -> Node {
        let mut n = Node::concept(id, None, None);
        n.id = id.to_string();
        n.is_root = is_root;
        n
    }

    fn reason(result: Result<(), GraphError>) -> String {
        match result {
            Err(GraphError::InvalidGraph { reason }) => reason,
            other => panic!("expected InvalidGraph, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_graph_is_valid() {
        assert!(validate_graph(&[], &[]).is_ok());
    }

    #[test]
    fn test_simple_tree_is_valid() {
        let nodes = vec![node("r", true), node("a", false), node("b", false)];
        let edges = vec![Edge::between("r", "a"), Edge::between("a", "b")];
        assert!(validate_graph(&nodes, &edges).is_ok());
    }

    #[test]
    fn test_missing_endpoint_rejected() {
        let nodes = vec![node("r", true)];
        let edges = vec![Edge::between("r", "ghost")];
        assert!(reason(validate_graph(&nodes, &edges)).contains("missing target 'ghost'"));

        let edges = vec![Edge::between("ghost", "r")];
        assert!(reason(validate_graph(&nodes, &edges)).contains("missing source 'ghost'"));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let nodes = vec![node("r", true), node("r", false)];
        assert!(reason(validate_graph(&nodes, &[])).contains("duplicate node id"));
    }

    #[test]
    fn test_self_edge_rejected() {
        let nodes = vec![node("r", true), node("a", false)];
        let edges = vec![Edge::between("a", "a")];
        assert!(reason(validate_graph(&nodes, &edges)).contains("self-edge"));
    }

    #[test]
    fn test_root_rules() {
        let two_roots = vec![node("r1", true), node("r2", true)];
        assert!(reason(validate_graph(&two_roots, &[])).contains("2 root nodes"));

        let no_root = vec![node("a", false)];
        assert!(reason(validate_graph(&no_root, &[])).contains("no root"));

        let nodes = vec![node("r", true), node("a", false)];
        let edges = vec![Edge::between("a", "r")];
        assert!(reason(validate_graph(&nodes, &edges)).contains("incoming edge"));
    }

    #[test]
    fn test_second_parent_rejected() {
        let nodes = vec![node("r", true), node("a", false), node("b", false)];
        let edges = vec![
            Edge::between("r", "a"),
            Edge::between("r", "b"),
            Edge::between("a", "b"),
        ];
        assert!(reason(validate_graph(&nodes, &edges)).contains("already has parent 'r'"));
    }

    #[test]
    fn test_cycle_rejected() {
        let nodes = vec![node("r", true), node("a", false), node("b", false)];
        let edges = vec![Edge::between("a", "b"), Edge::between("b", "a")];
        assert!(reason(validate_graph(&nodes, &edges)).contains("cycle"));
    }
}
