//! Breadth-first shortest paths over the switch graph.

use std::collections::VecDeque;

use super::adjacency::AdjacencyGraph;

/// Hop count and first hop toward one destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub distance: u32,
    /// Neighbour of the source to forward through (the destination itself when adjacent)
    pub next_hop: usize,
}

/// Single-source shortest paths, by contiguous switch index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortestPaths {
    source: usize,
    routes: Vec<Option<Route>>,
}

impl ShortestPaths {
    /// Run BFS from `source`.
    ///
    /// Neighbours are explored in declaration order, so among equal-length
    /// paths the one through the earliest-declared neighbour wins.
    pub fn from_source(graph: &AdjacencyGraph, source: usize) -> Self {
        let mut routes: Vec<Option<Route>> = vec![None; graph.len()];
        routes[source] = Some(Route { distance: 0, next_hop: source });

        let mut queue = VecDeque::from([source]);
        while let Some(current) = queue.pop_front() {
            let Some(here) = routes[current] else { continue };

            for neighbor in graph.neighbors(current) {
                if routes[neighbor].is_some() {
                    continue;
                }
                let next_hop = if current == source { neighbor } else { here.next_hop };
                routes[neighbor] = Some(Route { distance: here.distance + 1, next_hop });
                queue.push_back(neighbor);
            }
        }

        Self { source, routes }
    }

    pub fn source(&self) -> usize {
        self.source
    }

    /// Route to `dst`, `None` when unreachable
    pub fn route(&self, dst: usize) -> Option<Route> {
        self.routes.get(dst).copied().flatten()
    }

    pub fn distance(&self, dst: usize) -> Option<u32> {
        self.route(dst).map(|r| r.distance)
    }

    pub fn next_hop(&self, dst: usize) -> Option<usize> {
        self.route(dst).map(|r| r.next_hop)
    }

    pub fn reachable(&self) -> impl Iterator<Item = (usize, Route)> + '_ {
        self.routes
            .iter()
            .enumerate()
            .filter_map(|(idx, route)| route.map(|r| (idx, r)))
    }
}

/// Shortest paths from every switch, indexed by source
pub fn all_pairs(graph: &AdjacencyGraph) -> Vec<ShortestPaths> {
    (0..graph.len())
        .map(|source| ShortestPaths::from_source(graph, source))
        .collect()
}
