use crate::error::{FlowError, Result};
use crate::maximum_flow::dinic::Dinic;
use crate::maximum_flow::graph::Graph;
use tracing::debug;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Side {
    Left,
    Right,
}

/// Maximum bipartite matching reduced to unit-capacity flow.
///
/// Nodes `0..n` belong to the client. Two more nodes, `n` and `n + 1`, act as source and sink.
/// A node's side is fixed by the first edge that touches it: tail nodes are on the left and
/// head nodes on the right. Nodes that never appear in an edge stay unmatched.
pub struct BipartiteMatching {
    num_nodes: usize,
    graph: Graph<i64>,
    sides: Vec<Option<Side>>,
    // terminal arc already added for this node
    materialized: Vec<bool>,
    dinic: Dinic<i64>,
}

impl BipartiteMatching {
    pub fn new(num_nodes: usize) -> Self {
        Self {
            num_nodes,
            graph: Graph::new(num_nodes + 2),
            sides: vec![None; num_nodes],
            materialized: vec![false; num_nodes],
            dinic: Dinic::default(),
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.num_nodes
    }

    #[inline]
    fn source(&self) -> usize {
        self.num_nodes
    }

    #[inline]
    fn sink(&self) -> usize {
        self.num_nodes + 1
    }

    pub fn graph(&self) -> &Graph<i64> {
        &self.graph
    }

    pub fn add_edge(&mut self, from: usize, to: usize) -> Result<usize> {
        for u in [from, to] {
            if u >= self.num_nodes {
                return Err(FlowError::NodeOutOfRange { node: u, num_nodes: self.num_nodes });
            }
        }
        if from == to || self.sides[from] == Some(Side::Right) || self.sides[to] == Some(Side::Left) {
            return Err(FlowError::NotBipartite { from, to });
        }

        let edge_id = self.graph.add_directed_edge(from, to, 1)?;
        self.sides[from] = Some(Side::Left);
        self.sides[to] = Some(Side::Right);
        Ok(edge_id)
    }

    pub fn max_matching(&mut self) -> Result<i64> {
        self.max_matching_with_limit(i64::MAX)
    }

    /// Adds at most `limit` pairs to the current matching and returns how many were added.
    pub fn max_matching_with_limit(&mut self, limit: i64) -> Result<i64> {
        if limit < 0 {
            return Err(FlowError::NegativeLimit);
        }

        self.materialize_terminals()?;
        let (source, sink) = (self.source(), self.sink());
        self.dinic.solve_with_limit(source, sink, limit, &mut self.graph)
    }

    /// Matched `(left, right)` pairs in edge insertion order.
    pub fn matches(&self) -> Vec<(usize, usize)> {
        let (source, sink) = (self.source(), self.sink());
        self.graph.edges().into_iter().filter(|e| e.from != source && e.to != sink && e.flow > 0).map(|e| (e.from, e.to)).collect()
    }

    // source -> left and right -> sink, once per node, in ascending node order
    fn materialize_terminals(&mut self) -> Result<()> {
        let (source, sink) = (self.source(), self.sink());
        let mut added = 0;

        for side in [Side::Left, Side::Right] {
            for u in 0..self.num_nodes {
                if self.materialized[u] || self.sides[u] != Some(side) {
                    continue;
                }
                match side {
                    Side::Left => self.graph.add_directed_edge(source, u, 1)?,
                    Side::Right => self.graph.add_directed_edge(u, sink, 1)?,
                };
                self.materialized[u] = true;
                added += 1;
            }
        }

        if added > 0 {
            debug!(added, num_edges = self.graph.num_edges(), "materialized terminal arcs");
        }
        Ok(())
    }
}
