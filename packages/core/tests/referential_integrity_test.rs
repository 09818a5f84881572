//! Referential Integrity Property Tests
//!
//! Random sequences of add-node / add-edge attempts against the graph store.
//! Every committed graph must keep all edge endpoints inside its node set,
//! and every rejected commit must leave the previous state untouched.

#[cfg(test)]
mod referential_integrity_tests {
    use mindgraph_core::{Edge, GraphError, GraphSnapshot, GraphStore, Node};
    use proptest::prelude::*;
    use proptest::sample::Index;
    use std::collections::HashSet;

    #[derive(Debug, Clone)]
    enum Op {
        /// New node attached under an existing one
        AddChild(Index),
        /// New node with no edge
        AddLoose,
        /// Edge between two existing nodes (may break the tree shape)
        Link(Index, Index),
        /// Edge to a node id that does not exist
        LinkMissing(Index),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => any::<Index>().prop_map(Op::AddChild),
            1 => Just(Op::AddLoose),
            2 => (any::<Index>(), any::<Index>()).prop_map(|(a, b)| Op::Link(a, b)),
            1 => any::<Index>().prop_map(Op::LinkMissing),
        ]
    }

    fn assert_consistent(snapshot: &GraphSnapshot) {
        let ids: HashSet<&str> = snapshot.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids.len(), snapshot.nodes.len(), "node ids must be unique");
        for edge in &snapshot.edges {
            assert!(ids.contains(edge.source.as_str()), "dangling source");
            assert!(ids.contains(edge.target.as_str()), "dangling target");
        }
        assert_eq!(snapshot.nodes.iter().filter(|n| n.is_root).count(), 1);

        let mut targets = HashSet::new();
        for edge in &snapshot.edges {
            assert!(targets.insert(edge.target.as_str()), "second parent");
        }
    }

    proptest! {
        #[test]
        fn prop_commits_never_break_referential_integrity(
            ops in prop::collection::vec(op(), 1..60)
        ) {
            let store = GraphStore::default();
            store.commit(vec![Node::root("Root", None)], vec![]).unwrap();

            for op in ops {
                let before = store.snapshot();
                let mut nodes = before.nodes.clone();
                let mut edges = before.edges.clone();

                match op {
                    Op::AddChild(parent) => {
                        let parent_id = nodes[parent.index(nodes.len())].id.clone();
                        let child = Node::concept("child", None, None);
                        edges.push(Edge::between(&parent_id, &child.id));
                        nodes.push(child);
                    }
                    Op::AddLoose => nodes.push(Node::concept("loose", None, None)),
                    Op::Link(a, b) => {
                        let source = nodes[a.index(nodes.len())].id.clone();
                        let target = nodes[b.index(nodes.len())].id.clone();
                        edges.push(Edge::between(source, target));
                    }
                    Op::LinkMissing(a) => {
                        let source = nodes[a.index(nodes.len())].id.clone();
                        edges.push(Edge::between(source, "missing"));
                    }
                }

                match store.commit(nodes, edges) {
                    Ok(revision) => prop_assert_eq!(revision, before.revision + 1),
                    Err(err) => {
                        let is_invalid = matches!(err, GraphError::InvalidGraph { .. });
                        prop_assert!(is_invalid);
                        prop_assert_eq!(&*store.snapshot(), &*before);
                    }
                }

                assert_consistent(&store.snapshot());
            }
        }
    }

    #[test]
    fn test_missing_endpoint_is_always_rejected() {
        let store = GraphStore::default();
        let root = Node::root("Root", None);
        store.commit(vec![root.clone()], vec![]).unwrap();

        let result = store.commit(
            vec![root.clone()],
            vec![Edge::between(&root.id, "nowhere")],
        );
        assert!(matches!(result, Err(GraphError::InvalidGraph { .. })));
        assert!(store.snapshot().edges.is_empty());
        assert_eq!(store.snapshot().revision, 1);
    }
}
