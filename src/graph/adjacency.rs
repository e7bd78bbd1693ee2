//! Switch adjacency derived from declared links.

use std::collections::{BTreeSet, HashMap};

use log::debug;

use crate::error::Result;
use crate::topology::{Topology, TopologyIndex};

/// Undirected switch-to-switch adjacency.
///
/// Nodes are contiguous switch indices in declaration order, so neighbour
/// iteration (and with it BFS tie-breaking) follows the order switches were
/// declared in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjacencyGraph {
    ids: Vec<u32>,
    id_to_index: HashMap<u32, usize>,
    neighbors: Vec<BTreeSet<usize>>,
}

impl AdjacencyGraph {
    /// Build the graph from an already-indexed topology
    pub fn build(index: &TopologyIndex<'_>) -> Self {
        let ids: Vec<u32> = (0..index.len()).map(|idx| index.id(idx)).collect();
        let id_to_index = ids.iter().enumerate().map(|(idx, &id)| (id, idx)).collect();
        let mut neighbors = vec![BTreeSet::new(); index.len()];

        for from in 0..index.len() {
            for link in index.links(from) {
                match link.peer_switch() {
                    Some(to) if to != from => {
                        neighbors[from].insert(to);
                        neighbors[to].insert(from);
                    }
                    _ => {}
                }
            }
        }

        let graph = Self { ids, id_to_index, neighbors };
        debug!("Built switch graph: {} switches, {} edges", graph.len(), graph.edge_count());
        graph
    }

    /// Index the topology and build its graph.
    ///
    /// Fails with `MalformedTopology` when any declared address is unparsable.
    pub fn from_topology(topology: &Topology) -> Result<Self> {
        let index = TopologyIndex::build(topology)?;
        Ok(Self::build(&index))
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn id(&self, idx: usize) -> u32 {
        self.ids[idx]
    }

    pub fn index_of(&self, id: u32) -> Option<usize> {
        self.id_to_index.get(&id).copied()
    }

    /// Neighbour indices of `idx` in declaration order
    pub fn neighbors(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
        self.neighbors[idx].iter().copied()
    }

    /// Neighbour switch ids of switch `id`, or `None` for an unknown id
    pub fn neighbor_ids(&self, id: u32) -> Option<BTreeSet<u32>> {
        let idx = self.index_of(id)?;
        Some(self.neighbors(idx).map(|n| self.ids[n]).collect())
    }

    pub fn has_edge(&self, a: u32, b: u32) -> bool {
        match (self.index_of(a), self.index_of(b)) {
            (Some(a), Some(b)) => self.neighbors[a].contains(&b),
            _ => false,
        }
    }

    pub fn edge_count(&self) -> usize {
        self.neighbors.iter().map(BTreeSet::len).sum::<usize>() / 2
    }
}
