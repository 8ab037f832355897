pub mod bipartite_matching;
pub mod error;
pub mod maximum_flow;
