//! Deterministic hierarchical layout for mind maps.
//!
//! Implements a top-down layered layout:
//!   1. Rank assignment (longest path from sources)
//!   2. Ordering within ranks (depth-first, children in edge-insertion order)
//!   3. Horizontal packing (each subtree owns a band; parents centred on it)
//!   4. Vertical placement (rank bands sized by their tallest box)
//!   5. Anchor conversion (centre → top-left)
//!
//! Identical node/edge sequences always produce identical positions: there
//! is no randomness, no clock, and no state kept between runs. Incoming
//! positions are ignored, so re-running on a laid-out graph is a no-op.
//!
//! Every mutation re-lays the whole graph; at tens of nodes this is cheap and
//! keeps the picture globally tidy.

mod config;

pub use config::LayoutConfig;

use crate::models::{Edge, Node, Position};
use std::collections::HashMap;

/// Sentinel for "not ranked by the acyclic pass"
const UNRANKED: usize = usize::MAX;

// ── Internal graph representation ────────────────────────────────────

/// Adjacency lists over node indices, in edge-insertion order.
struct LayoutGraph {
    n: usize,
    adj: Vec<Vec<usize>>,
    rev: Vec<Vec<usize>>,
}

impl LayoutGraph {
    /// Edges with unknown endpoints and self-edges are skipped.
    fn from_parts(nodes: &[Node], edges: &[Edge]) -> Self {
        let n = nodes.len();
        let mut index: HashMap<&str, usize> = HashMap::with_capacity(n);
        for (i, node) in nodes.iter().enumerate() {
            index.entry(node.id.as_str()).or_insert(i);
        }

        let mut adj = vec![Vec::new(); n];
        let mut rev = vec![Vec::new(); n];
        for edge in edges {
            let (Some(&u), Some(&v)) = (
                index.get(edge.source.as_str()),
                index.get(edge.target.as_str()),
            ) else {
                continue;
            };
            if u == v || adj[u].contains(&v) {
                continue;
            }
            adj[u].push(v);
            rev[v].push(u);
        }

        Self { n, adj, rev }
    }
}

/// Spanning forest used for ordering and packing.
struct LayoutForest {
    /// Forest roots, left to right
    roots: Vec<usize>,
    /// Tree children per node, left to right
    children: Vec<Vec<usize>>,
    /// All nodes in depth-first pre-order
    preorder: Vec<usize>,
}

// ── Phase 1: Rank assignment ─────────────────────────────────────────

/// Longest-path layering via Kahn's algorithm.
///
/// Sources start at rank 0 and every other node sits one below its deepest
/// predecessor. Nodes trapped behind a cycle stay `UNRANKED` and are ranked
/// later from the spanning forest.
fn longest_path_ranks(graph: &LayoutGraph) -> Vec<usize> {
    let mut in_degree: Vec<usize> = graph.rev.iter().map(Vec::len).collect();
    let mut ranks = vec![UNRANKED; graph.n];

    let mut queue: Vec<usize> = (0..graph.n).filter(|&v| in_degree[v] == 0).collect();
    for &v in &queue {
        ranks[v] = 0;
    }

    let mut head = 0;
    while head < queue.len() {
        let u = queue[head];
        head += 1;

        for &v in &graph.adj[u] {
            let candidate = ranks[u] + 1;
            if ranks[v] == UNRANKED || ranks[v] < candidate {
                ranks[v] = candidate;
            }
            in_degree[v] -= 1;
            if in_degree[v] == 0 {
                queue.push(v);
            }
        }
    }

    // Anything not dequeued is on or below a cycle; its partial rank is unreliable.
    let dequeued: Vec<bool> = {
        let mut seen = vec![false; graph.n];
        for &v in &queue {
            seen[v] = true;
        }
        seen
    };
    for (v, rank) in ranks.iter_mut().enumerate() {
        if !dequeued[v] {
            *rank = UNRANKED;
        }
    }

    ranks
}

// ── Phase 2: Ordering ────────────────────────────────────────────────

/// Depth-first spanning forest.
///
/// The root node goes first, then other sources in node order, then any
/// node only reachable through a cycle. A node hangs under the first parent
/// that reaches it; siblings keep edge-insertion order, so appending a leaf
/// never reorders earlier siblings.
fn build_forest(nodes: &[Node], graph: &LayoutGraph) -> LayoutForest {
    let mut starts: Vec<usize> = Vec::with_capacity(graph.n);
    starts.extend((0..graph.n).filter(|&v| graph.rev[v].is_empty() && nodes[v].is_root));
    starts.extend((0..graph.n).filter(|&v| graph.rev[v].is_empty() && !nodes[v].is_root));
    starts.extend(0..graph.n);

    let mut visited = vec![false; graph.n];
    let mut roots = Vec::new();
    let mut children = vec![Vec::new(); graph.n];
    let mut preorder = Vec::with_capacity(graph.n);

    for start in starts {
        if visited[start] {
            continue;
        }
        visited[start] = true;
        roots.push(start);

        let mut stack = vec![start];
        while let Some(u) = stack.pop() {
            preorder.push(u);
            for &v in &graph.adj[u] {
                if !visited[v] {
                    visited[v] = true;
                    children[u].push(v);
                }
            }
            stack.extend(children[u].iter().rev().copied());
        }
    }

    LayoutForest {
        roots,
        children,
        preorder,
    }
}

/// Give cycle-bound nodes a rank one below their forest parent.
fn fill_unranked(ranks: &mut [usize], forest: &LayoutForest) {
    let max_rank = ranks
        .iter()
        .copied()
        .filter(|&r| r != UNRANKED)
        .max()
        .unwrap_or(0);

    for &root in &forest.roots {
        if ranks[root] == UNRANKED {
            ranks[root] = max_rank + 1;
        }
    }
    for &u in &forest.preorder {
        for &v in &forest.children[u] {
            if ranks[v] == UNRANKED {
                ranks[v] = ranks[u] + 1;
            }
        }
    }
}

// ── Phase 3: Horizontal packing ──────────────────────────────────────

/// Width of the band each subtree occupies.
fn subtree_bands(forest: &LayoutForest, widths: &[f64], node_sep: f64) -> Vec<f64> {
    let mut bands = widths.to_vec();
    for &u in forest.preorder.iter().rev() {
        let kids = &forest.children[u];
        if kids.is_empty() {
            continue;
        }
        let span: f64 =
            kids.iter().map(|&c| bands[c]).sum::<f64>() + node_sep * (kids.len() - 1) as f64;
        bands[u] = bands[u].max(span);
    }
    bands
}

/// Horizontal centre of every node.
fn assign_x(forest: &LayoutForest, bands: &[f64], node_sep: f64, margin_x: f64) -> Vec<f64> {
    let mut centers = vec![0.0; bands.len()];
    let mut lefts = vec![0.0; bands.len()];

    let mut cursor = margin_x;
    for &root in &forest.roots {
        lefts[root] = cursor;
        cursor += bands[root] + node_sep;
    }

    for &u in &forest.preorder {
        centers[u] = lefts[u] + bands[u] / 2.0;

        let kids = &forest.children[u];
        if kids.is_empty() {
            continue;
        }
        let span: f64 =
            kids.iter().map(|&c| bands[c]).sum::<f64>() + node_sep * (kids.len() - 1) as f64;
        let mut child_left = lefts[u] + (bands[u] - span) / 2.0;
        for &c in kids {
            lefts[c] = child_left;
            child_left += bands[c] + node_sep;
        }
    }

    centers
}

// ── Phase 4: Vertical placement ──────────────────────────────────────

/// Vertical centre of every node: each rank is a band as tall as its tallest box.
fn assign_y(ranks: &[usize], heights: &[f64], rank_sep: f64, margin_y: f64) -> Vec<f64> {
    let rank_count = ranks.iter().copied().max().map_or(0, |r| r + 1);
    let mut rank_heights = vec![0.0_f64; rank_count];
    for (v, &r) in ranks.iter().enumerate() {
        rank_heights[r] = rank_heights[r].max(heights[v]);
    }

    let mut rank_tops = Vec::with_capacity(rank_count);
    let mut top = margin_y;
    for height in &rank_heights {
        rank_tops.push(top);
        top += height + rank_sep;
    }

    ranks
        .iter()
        .map(|&r| rank_tops[r] + rank_heights[r] / 2.0)
        .collect()
}

// ── Engine ───────────────────────────────────────────────────────────

/// Layered layout engine. Stateless apart from its configuration.
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Rank of every node, in input order
    pub fn ranks(&self, nodes: &[Node], edges: &[Edge]) -> Vec<usize> {
        let graph = LayoutGraph::from_parts(nodes, edges);
        let forest = build_forest(nodes, &graph);
        let mut ranks = longest_path_ranks(&graph);
        fill_unranked(&mut ranks, &forest);
        ranks
    }

    /// Compute positions for every node.
    ///
    /// Returns the nodes in input order with `position` set to the top-left
    /// corner of each box. Edges referencing unknown nodes are ignored.
    pub fn layout(&self, nodes: &[Node], edges: &[Edge]) -> Vec<Node> {
        if nodes.is_empty() {
            return Vec::new();
        }

        let graph = LayoutGraph::from_parts(nodes, edges);
        let forest = build_forest(nodes, &graph);
        let mut ranks = longest_path_ranks(&graph);
        fill_unranked(&mut ranks, &forest);

        let sizes: Vec<(f64, f64)> = nodes.iter().map(|n| self.config.size_of(n)).collect();
        let widths: Vec<f64> = sizes.iter().map(|s| s.0).collect();
        let heights: Vec<f64> = sizes.iter().map(|s| s.1).collect();

        let bands = subtree_bands(&forest, &widths, self.config.node_sep);
        let center_x = assign_x(&forest, &bands, self.config.node_sep, self.config.margin_x);
        let center_y = assign_y(&ranks, &heights, self.config.rank_sep, self.config.margin_y);

        tracing::debug!(
            "Laid out {} nodes across {} ranks ({} trees)",
            nodes.len(),
            ranks.iter().copied().max().map_or(0, |r| r + 1),
            forest.roots.len()
        );

        nodes
            .iter()
            .enumerate()
            .map(|(i, node)| {
                let mut placed = node.clone();
                placed.position = Position::new(
                    center_x[i] - widths[i] / 2.0,
                    center_y[i] - heights[i] / 2.0,
                );
                placed
            })
            .collect()
    }
}
