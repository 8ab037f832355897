use crate::error::{FlowError, Result};
use num_traits::NumAssign;
use std::collections::VecDeque;

/// Snapshot of a client edge. `upper` is the original capacity.
#[derive(PartialEq, Debug, Clone)]
pub struct Edge<Flow> {
    pub from: usize,
    pub to: usize,
    pub flow: Flow,
    pub upper: Flow,
}

/// One direction of a residual pair. Edge `i` owns arcs `2 * i` (forward) and `2 * i + 1` (reverse).
#[derive(Default, PartialEq, Debug, Clone)]
pub(crate) struct ResidualArc<Flow> {
    pub to: usize,
    pub twin: usize,
    pub residual_capacity: Flow,
}

#[derive(Default)]
pub struct Graph<Flow> {
    pub(crate) arcs: Vec<ResidualArc<Flow>>,
    // per node, arena indices of outgoing arcs in insertion order
    pub(crate) adjacency: Vec<Vec<usize>>,
}

impl<Flow> Graph<Flow>
where
    Flow: NumAssign + Ord + Copy,
{
    pub fn new(num_nodes: usize) -> Self {
        Self { arcs: Vec::new(), adjacency: vec![Vec::new(); num_nodes] }
    }

    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.adjacency.len()
    }

    #[inline]
    pub fn num_edges(&self) -> usize {
        self.arcs.len() / 2
    }

    pub fn add_node(&mut self) -> usize {
        self.adjacency.push(Vec::new());
        self.num_nodes() - 1
    }

    pub fn add_nodes(&mut self, num_nodes: usize) -> Vec<usize> {
        let start = self.num_nodes();
        self.adjacency.resize(start + num_nodes, Vec::new());
        (start..self.num_nodes()).collect()
    }

    // return edge index
    pub fn add_directed_edge(&mut self, from: usize, to: usize, upper: Flow) -> Result<usize> {
        self.check_node(from)?;
        self.check_node(to)?;
        if upper < Flow::zero() {
            return Err(FlowError::NegativeCapacity);
        }

        // self-loops still get two distinct slots, both in adjacency[from]
        let forward = self.arcs.len();
        let reverse = forward + 1;
        self.arcs.push(ResidualArc { to, twin: reverse, residual_capacity: upper });
        self.arcs.push(ResidualArc { to: from, twin: forward, residual_capacity: Flow::zero() });
        self.adjacency[from].push(forward);
        self.adjacency[to].push(reverse);

        Ok(self.num_edges() - 1)
    }

    /// Two independent directed edges, each with its own residual pair.
    pub fn add_undirected_edge(&mut self, u: usize, v: usize, upper: Flow) -> Result<(usize, usize)> {
        self.check_node(u)?;
        self.check_node(v)?;
        let forward = self.add_directed_edge(u, v, upper)?;
        let backward = self.add_directed_edge(v, u, upper)?;
        Ok((forward, backward))
    }

    pub fn get_edge(&self, edge_id: usize) -> Result<Edge<Flow>> {
        self.check_edge(edge_id)?;
        let forward = &self.arcs[2 * edge_id];
        let reverse = &self.arcs[2 * edge_id + 1];
        Ok(Edge {
            from: reverse.to,
            to: forward.to,
            flow: reverse.residual_capacity,
            upper: forward.residual_capacity + reverse.residual_capacity,
        })
    }

    /// All edges in insertion order.
    pub fn edges(&self) -> Vec<Edge<Flow>> {
        self.arcs
            .chunks_exact(2)
            .map(|pair| Edge {
                from: pair[1].to,
                to: pair[0].to,
                flow: pair[1].residual_capacity,
                upper: pair[0].residual_capacity + pair[1].residual_capacity,
            })
            .collect()
    }

    /// Overwrites the residual pair of `edge_id`. Only meaningful between solves.
    pub fn change_edge(&mut self, edge_id: usize, upper: Flow, flow: Flow) -> Result<()> {
        self.check_edge(edge_id)?;
        if flow < Flow::zero() || flow > upper {
            return Err(FlowError::InvalidFlow);
        }

        self.arcs[2 * edge_id].residual_capacity = upper - flow;
        self.arcs[2 * edge_id + 1].residual_capacity = flow;
        Ok(())
    }

    /// Net flow leaving `source`.
    pub fn maximum_flow(&self, source: usize) -> Flow {
        self.edges().into_iter().fold(Flow::zero(), |mut flow, edge| {
            if edge.from == source && edge.to != source {
                flow += edge.flow;
            } else if edge.to == source && edge.from != source {
                flow -= edge.flow;
            }
            flow
        })
    }

    // O(n + m)
    // nodes reachable from source in the residual network, ascending
    // only a minimum cut once the last solve from source has exhausted every augmenting path
    pub fn minimum_cut(&self, source: usize) -> Result<Vec<usize>> {
        self.check_node(source)?;

        let mut visited = vec![false; self.num_nodes()];
        let mut que = VecDeque::from([source]);
        visited[source] = true;

        while let Some(u) = que.pop_front() {
            for &arc_id in self.adjacency[u].iter() {
                let arc = &self.arcs[arc_id];
                if !visited[arc.to] && arc.residual_capacity > Flow::zero() {
                    visited[arc.to] = true;
                    que.push_back(arc.to);
                }
            }
        }

        Ok((0..self.num_nodes()).filter(|&u| visited[u]).collect())
    }

    /// Sum of original capacities over edges leaving `source_side`.
    pub fn cut_capacity(&self, source_side: &[usize]) -> Flow {
        let mut inside = vec![false; self.num_nodes()];
        for &u in source_side.iter().filter(|&&u| u < self.num_nodes()) {
            inside[u] = true;
        }

        self.edges().into_iter().filter(|e| inside[e.from] && !inside[e.to]).fold(Flow::zero(), |sum, e| sum + e.upper)
    }

    #[inline]
    pub(crate) fn push_flow(&mut self, arc_id: usize, flow: Flow) {
        let twin = self.arcs[arc_id].twin;

        // update residual capacities
        self.arcs[arc_id].residual_capacity -= flow;
        self.arcs[twin].residual_capacity += flow;
    }

    #[inline]
    pub(crate) fn check_node(&self, u: usize) -> Result<()> {
        if u >= self.num_nodes() {
            return Err(FlowError::NodeOutOfRange { node: u, num_nodes: self.num_nodes() });
        }
        Ok(())
    }

    #[inline]
    fn check_edge(&self, edge_id: usize) -> Result<()> {
        if edge_id >= self.num_edges() {
            return Err(FlowError::EdgeOutOfRange { edge: edge_id, num_edges: self.num_edges() });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_loop_gets_two_distinct_arcs() {
        let mut graph = Graph::new(1);
        let edge_id = graph.add_directed_edge(0, 0, 5).unwrap();

        assert_eq!(graph.adjacency[0], vec![0, 1]);
        assert_eq!(graph.arcs[0].twin, 1);
        assert_eq!(graph.arcs[1].twin, 0);
        assert_eq!(graph.get_edge(edge_id).unwrap(), Edge { from: 0, to: 0, flow: 0, upper: 5 });
    }

    #[test]
    fn push_flow_conserves_capacity() {
        let mut graph = Graph::new(2);
        graph.add_directed_edge(0, 1, 7).unwrap();
        graph.push_flow(0, 3);

        assert_eq!(graph.arcs[0].residual_capacity, 4);
        assert_eq!(graph.arcs[1].residual_capacity, 3);

        graph.push_flow(1, 2);
        assert_eq!(graph.get_edge(0).unwrap(), Edge { from: 0, to: 1, flow: 1, upper: 7 });
    }

    #[test]
    fn edge_ids_survive_growth_elsewhere() {
        let mut graph = Graph::new(3);
        let first = graph.add_directed_edge(0, 1, 2).unwrap();
        graph.add_nodes(10);
        graph.add_directed_edge(2, 12, 4).unwrap();
        graph.add_directed_edge(0, 2, 1).unwrap();

        assert_eq!(graph.get_edge(first).unwrap(), Edge { from: 0, to: 1, flow: 0, upper: 2 });
    }
}
