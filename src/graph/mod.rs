//! Switch graph and shortest-path search used by the legacy table scheme.

pub mod adjacency;
pub mod bfs;

pub use adjacency::AdjacencyGraph;
pub use bfs::{all_pairs, Route, ShortestPaths};
