pub mod dinic;
pub mod graph;
