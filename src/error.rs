use thiserror::Error;

pub type Result<T> = std::result::Result<T, FlowError>;

/// Rejected precondition. The call that returns it has not touched the network.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum FlowError {
    #[error("node {node} is out of range (num_nodes = {num_nodes})")]
    NodeOutOfRange { node: usize, num_nodes: usize },

    #[error("edge {edge} is out of range (num_edges = {num_edges})")]
    EdgeOutOfRange { edge: usize, num_edges: usize },

    #[error("capacity must be non-negative")]
    NegativeCapacity,

    #[error("flow limit must be non-negative")]
    NegativeLimit,

    #[error("source and sink must differ (both are {node})")]
    SameSourceAndSink { node: usize },

    /// `change_edge` with a flow outside `[0, upper]`.
    #[error("flow must lie in [0, upper]")]
    InvalidFlow,

    #[error("edge {from} -> {to} breaks the bipartite partition")]
    NotBipartite { from: usize, to: usize },
}
