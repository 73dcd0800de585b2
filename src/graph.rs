//! Static graph abstraction consumed by the optimizer.
//!
//! The optimizer only needs node enumeration, neighbor enumeration and the
//! node count. Nodes are dense identifiers `0..node_count`; loaders that work
//! with sparse or string identifiers are expected to remap before handing the
//! graph over.

use std::ops::Range;

/// Node identifier. Always in `0..graph.node_count()`.
pub type NodeId = usize;

/// Read-only graph interface.
///
/// The graph must stay immutable for the duration of an optimization run.
pub trait Graph: Send + Sync {
    /// Number of nodes.
    fn node_count(&self) -> usize;

    /// Neighbors of `node`. For undirected graphs each edge appears in both
    /// adjacency lists.
    fn neighbors(&self, node: NodeId) -> &[NodeId];

    /// All node identifiers.
    fn nodes(&self) -> Range<NodeId> {
        0..self.node_count()
    }

    /// Number of neighbors of `node`.
    fn degree(&self, node: NodeId) -> usize {
        self.neighbors(node).len()
    }
}

/// Undirected graph stored as adjacency lists.
///
/// # Example
///
/// ```
/// use u_seedopt::graph::{AdjacencyGraph, Graph};
///
/// let g = AdjacencyGraph::from_edges(4, &[(0, 1), (1, 2), (2, 3)]);
/// assert_eq!(g.node_count(), 4);
/// assert_eq!(g.neighbors(1), &[0, 2]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct AdjacencyGraph {
    adjacency: Vec<Vec<NodeId>>,
}

impl AdjacencyGraph {
    /// Creates a graph with `node_count` isolated nodes.
    pub fn new(node_count: usize) -> Self {
        Self {
            adjacency: vec![Vec::new(); node_count],
        }
    }

    /// Builds an undirected graph from an edge list.
    ///
    /// Self-loops, duplicate edges and edges referencing nodes outside
    /// `0..node_count` are ignored.
    pub fn from_edges(node_count: usize, edges: &[(NodeId, NodeId)]) -> Self {
        let mut graph = Self::new(node_count);
        for &(u, v) in edges {
            graph.add_edge(u, v);
        }
        graph
    }

    /// Adds an undirected edge. Returns `false` if it was ignored.
    pub fn add_edge(&mut self, u: NodeId, v: NodeId) -> bool {
        let n = self.adjacency.len();
        if u == v || u >= n || v >= n || self.adjacency[u].contains(&v) {
            return false;
        }
        self.adjacency[u].push(v);
        self.adjacency[v].push(u);
        true
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum::<usize>() / 2
    }
}

impl Graph for AdjacencyGraph {
    fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    fn neighbors(&self, node: NodeId) -> &[NodeId] {
        &self.adjacency[node]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_edges_ignores_invalid() {
        let g = AdjacencyGraph::from_edges(3, &[(0, 1), (1, 0), (2, 2), (0, 7)]);
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.degree(0), 1);
        assert_eq!(g.degree(2), 0);
    }

    #[test]
    fn test_nodes_range() {
        let g = AdjacencyGraph::new(5);
        assert_eq!(g.nodes().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
    }
}
