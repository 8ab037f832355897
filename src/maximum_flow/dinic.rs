use crate::error::{FlowError, Result};
use crate::maximum_flow::graph::Graph;
use num_traits::{Bounded, NumAssign};
use std::collections::VecDeque;
use tracing::{debug, trace};

const UNVISITED: usize = usize::MAX;

// an active node on the augmenting path
#[derive(Clone, Copy, Debug, PartialEq)]
struct Frame<Flow> {
    u: usize,
    upper: Flow,
    pushed: Flow,
}

/// Dinic's blocking flow algorithm, pushing directly on the residual arcs of a [`Graph`].
///
/// The buffers kept here are scratch space. They are reset at the start of every call, so one
/// solver can be reused across graphs.
#[derive(Default)]
pub struct Dinic<Flow> {
    levels: Vec<usize>, // distance from source in the residual network
    current_edge: Vec<usize>,
    que: VecDeque<usize>,
    stack: Vec<Frame<Flow>>,
}

impl<Flow> Dinic<Flow>
where
    Flow: NumAssign + Ord + Copy + Bounded,
{
    pub fn solve(&mut self, source: usize, sink: usize, graph: &mut Graph<Flow>) -> Result<Flow> {
        self.solve_with_limit(source, sink, Flow::max_value(), graph)
    }

    /// Pushes at most `limit` units from `source` to `sink` and returns the amount pushed.
    pub fn solve_with_limit(&mut self, source: usize, sink: usize, limit: Flow, graph: &mut Graph<Flow>) -> Result<Flow> {
        graph.check_node(source)?;
        graph.check_node(sink)?;
        if source == sink {
            return Err(FlowError::SameSourceAndSink { node: source });
        }
        if limit < Flow::zero() {
            return Err(FlowError::NegativeLimit);
        }

        let num_nodes = graph.num_nodes();
        self.levels.clear();
        self.levels.resize(num_nodes, UNVISITED);
        self.current_edge.clear();
        self.current_edge.resize(num_nodes, 0);

        let mut flow = Flow::zero();
        let mut phase = 0;
        while flow < limit {
            self.update_levels(source, sink, graph);

            // no s-t path
            if self.levels[sink] == UNVISITED {
                break;
            }

            self.current_edge.fill(0);
            let delta = self.augment(source, sink, limit - flow, graph);
            phase += 1;
            trace!(phase, sink_level = self.levels[sink], blocked = delta == Flow::zero(), "dinic phase");
            if delta == Flow::zero() {
                break;
            }
            flow += delta;
        }

        debug!(source, sink, phases = phase, reached_limit = flow == limit, "dinic finished");
        Ok(flow)
    }

    // O(n + m)
    // breadth-first levels from source over arcs with residual capacity, stopping once sink is labelled
    fn update_levels(&mut self, source: usize, sink: usize, graph: &Graph<Flow>) {
        self.levels.fill(UNVISITED);
        self.levels[source] = 0;
        self.que.clear();
        self.que.push_back(source);

        while let Some(u) = self.que.pop_front() {
            for &arc_id in graph.adjacency[u].iter() {
                let arc = &graph.arcs[arc_id];
                if arc.residual_capacity == Flow::zero() || self.levels[arc.to] != UNVISITED {
                    continue;
                }

                self.levels[arc.to] = self.levels[u] + 1;
                if arc.to == sink {
                    return;
                }
                self.que.push_back(arc.to);
            }
        }
    }

    #[inline]
    fn is_admissible_arc(&self, u: usize, arc_id: usize, graph: &Graph<Flow>) -> bool {
        let arc = &graph.arcs[arc_id];
        arc.residual_capacity > Flow::zero() && self.levels[arc.to] == self.levels[u] + 1
    }

    // depth-first search on the level graph with an explicit frame stack
    // returns the blocking flow of this phase, at most `upper`
    fn augment(&mut self, source: usize, sink: usize, upper: Flow, graph: &mut Graph<Flow>) -> Flow {
        let dead = graph.num_nodes();
        self.stack.clear();
        self.stack.push(Frame { u: source, upper, pushed: Flow::zero() });

        // flow handed back by the frame popped last
        let mut returned: Option<Flow> = None;

        while let Some(frame) = self.stack.last_mut() {
            let u = frame.u;

            if let Some(d) = returned.take() {
                if d > Flow::zero() {
                    let arc_id = graph.adjacency[u][self.current_edge[u]];
                    graph.push_flow(arc_id, d);
                    frame.pushed += d;
                    if frame.pushed == frame.upper {
                        // the current arc may still have capacity, keep it
                        returned = Some(frame.pushed);
                        self.stack.pop();
                        continue;
                    }
                }
                self.current_edge[u] += 1;
            }

            if u == sink {
                let frame = *frame;
                returned = Some(frame.upper);
                self.stack.pop();
                continue;
            }

            let Frame { upper, pushed, .. } = *frame;
            let mut next = None;
            while self.current_edge[u] < graph.adjacency[u].len() {
                let arc_id = graph.adjacency[u][self.current_edge[u]];
                if self.is_admissible_arc(u, arc_id, graph) {
                    let arc = &graph.arcs[arc_id];
                    next = Some(Frame { u: arc.to, upper: arc.residual_capacity.min(upper - pushed), pushed: Flow::zero() });
                    break;
                }
                self.current_edge[u] += 1;
            }

            match next {
                Some(child) => self.stack.push(child),
                None => {
                    // exhausted: u cannot reach sink for the rest of this phase
                    self.levels[u] = dead;
                    returned = Some(pushed);
                    self.stack.pop();
                }
            }
        }

        returned.unwrap_or_else(Flow::zero)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_stop_at_sink() {
        let mut graph = Graph::new(4);
        graph.add_directed_edge(0, 1, 1).unwrap();
        graph.add_directed_edge(1, 2, 1).unwrap();
        graph.add_directed_edge(1, 3, 1).unwrap();

        let mut dinic = Dinic::default();
        dinic.levels.resize(4, UNVISITED);
        dinic.update_levels(0, 2, &graph);

        assert_eq!(dinic.levels, vec![0, 1, 2, UNVISITED]);
    }

    #[test]
    fn deep_path_does_not_recurse() {
        let n = 200_000;
        let mut graph = Graph::new(n);
        for u in 0..n - 1 {
            graph.add_directed_edge(u, u + 1, 3_i64).unwrap();
        }

        assert_eq!(Dinic::default().solve(0, n - 1, &mut graph), Ok(3));
    }

    #[test]
    fn second_phase_uses_longer_path() {
        // 1 -> 3 is saturated in the first phase, 1 -> 2 -> 3 carries the second unit
        let mut graph = Graph::new(4);
        graph.add_directed_edge(0, 1, 2_i64).unwrap();
        graph.add_directed_edge(1, 2, 1).unwrap();
        graph.add_directed_edge(1, 3, 1).unwrap();
        graph.add_directed_edge(2, 3, 1).unwrap();

        assert_eq!(Dinic::default().solve(0, 3, &mut graph), Ok(2));
    }
}
