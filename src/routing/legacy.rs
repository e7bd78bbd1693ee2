//! Legacy two-level tables: host access table plus all-pairs switch path matrix.
//!
//! Works on any connected switch graph. A packet is forwarded by first looking
//! up the destination host's attaching switch, then following the
//! switch-to-switch matrix until that switch is reached.

use std::net::Ipv4Addr;

use log::{debug, info};

use crate::error::{Result, RouteError};
use crate::graph::{AdjacencyGraph, ShortestPaths};
use crate::topology::{Topology, TopologyIndex};
use crate::utils::MacAddr;

/// Where a host attaches to the fabric
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostEntry {
    pub host_ip: Ipv4Addr,
    pub switch_id: u32,
    /// Local address of the attaching switch on the host link
    pub switch_ip: Ipv4Addr,
    pub port: u16,
    pub qp: u16,
    pub mac: MacAddr,
}

/// Forwarding decision for one ordered switch pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchPathEntry {
    pub valid: bool,
    pub next_hop_switch_id: u32,
    pub out_port: u16,
    pub out_qp: u16,
    pub distance: u32,
    pub next_hop_ip: Ipv4Addr,
    pub next_hop_port: u16,
    pub next_hop_qp: u16,
    pub next_hop_mac: MacAddr,
}

impl Default for SwitchPathEntry {
    fn default() -> Self {
        Self {
            valid: false,
            next_hop_switch_id: 0,
            out_port: 0,
            out_qp: 0,
            distance: 0,
            next_hop_ip: Ipv4Addr::UNSPECIFIED,
            next_hop_port: 0,
            next_hop_qp: 0,
            next_hop_mac: MacAddr::default(),
        }
    }
}

/// Dense `(max_switch_id + 1)²` matrix addressed as `src * (max_switch_id + 1) + dst`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchPathMatrix {
    switch_count: u32,
    max_switch_id: u32,
    entries: Vec<SwitchPathEntry>,
}

impl SwitchPathMatrix {
    /// Allocate an all-invalid matrix sized for `max_switch_id`
    pub fn new(switch_count: u32, max_switch_id: u32) -> Result<Self> {
        let size = (max_switch_id as usize)
            .checked_add(1)
            .and_then(|dimension| dimension.checked_mul(dimension))
            .ok_or_else(|| {
                RouteError::ResourceExhausted(format!(
                    "switch path matrix for max switch id {} overflows",
                    max_switch_id
                ))
            })?;

        let mut entries = Vec::new();
        entries.try_reserve_exact(size).map_err(|e| {
            RouteError::ResourceExhausted(format!(
                "cannot allocate switch path matrix of {} entries: {}",
                size, e
            ))
        })?;
        entries.resize(size, SwitchPathEntry::default());

        Ok(Self { switch_count, max_switch_id, entries })
    }

    /// Rebuild a matrix from decoded entries
    pub fn from_entries(
        switch_count: u32,
        max_switch_id: u32,
        entries: Vec<SwitchPathEntry>,
    ) -> Result<Self> {
        let dimension = max_switch_id as usize + 1;
        if dimension.checked_mul(dimension) != Some(entries.len()) {
            return Err(RouteError::DecodingFailed(format!(
                "{} entries do not form a {}x{} matrix",
                entries.len(),
                dimension,
                dimension
            )));
        }
        Ok(Self { switch_count, max_switch_id, entries })
    }

    pub fn switch_count(&self) -> u32 {
        self.switch_count
    }

    pub fn max_switch_id(&self) -> u32 {
        self.max_switch_id
    }

    pub fn dimension(&self) -> usize {
        self.max_switch_id as usize + 1
    }

    fn offset(&self, src: u32, dst: u32) -> Option<usize> {
        if src > self.max_switch_id || dst > self.max_switch_id {
            return None;
        }
        Some(src as usize * self.dimension() + dst as usize)
    }

    pub fn get(&self, src: u32, dst: u32) -> Option<&SwitchPathEntry> {
        self.offset(src, dst).map(|o| &self.entries[o])
    }

    fn set(&mut self, src: u32, dst: u32, entry: SwitchPathEntry) {
        if let Some(o) = self.offset(src, dst) {
            self.entries[o] = entry;
        }
    }

    /// All entries in matrix order
    pub fn entries(&self) -> &[SwitchPathEntry] {
        &self.entries
    }

    pub fn valid_count(&self) -> usize {
        self.entries.iter().filter(|e| e.valid).count()
    }
}

/// Output of the legacy builder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyTables {
    pub hosts: Vec<HostEntry>,
    pub paths: SwitchPathMatrix,
}

impl LegacyTables {
    /// Host entry for `ip`
    pub fn host(&self, ip: Ipv4Addr) -> Option<&HostEntry> {
        self.hosts.iter().find(|h| h.host_ip == ip)
    }
}

/// One entry per host connection, in switch then connection order.
///
/// A host attached to two switches gets two entries; lookups by IP see the first.
pub fn build_host_table(index: &TopologyIndex<'_>) -> Vec<HostEntry> {
    let mut hosts = Vec::new();
    for idx in 0..index.len() {
        for link in index.links(idx).iter().filter(|l| l.is_host_link()) {
            hosts.push(HostEntry {
                host_ip: link.peer.ip,
                switch_id: index.id(idx),
                switch_ip: link.local.ip,
                port: link.local.port,
                qp: link.local.qp,
                mac: link.peer.mac,
            });
        }
    }
    hosts
}

/// Run BFS from every switch and record the first hop toward every other one
pub fn build_switch_path_matrix(
    index: &TopologyIndex<'_>,
    graph: &AdjacencyGraph,
) -> Result<SwitchPathMatrix> {
    let switch_count = u32::try_from(index.len())
        .map_err(|_| RouteError::ResourceExhausted(format!("{} switches", index.len())))?;
    let max_switch_id = index.max_switch_id().unwrap_or(0);
    let mut matrix = SwitchPathMatrix::new(switch_count, max_switch_id)?;

    for src in 0..index.len() {
        let paths = ShortestPaths::from_source(graph, src);

        for (dst, route) in paths.reachable() {
            if dst == src {
                continue;
            }

            let link = index.link_to_switch(src, route.next_hop).ok_or_else(|| {
                RouteError::malformed(format!(
                    "switch {} has no connection toward next hop {} (destination {})",
                    index.id(src),
                    index.id(route.next_hop),
                    index.id(dst)
                ))
            })?;

            matrix.set(
                index.id(src),
                index.id(dst),
                SwitchPathEntry {
                    valid: true,
                    next_hop_switch_id: index.id(route.next_hop),
                    out_port: link.local.port,
                    out_qp: link.local.qp,
                    distance: route.distance,
                    next_hop_ip: link.peer.ip,
                    next_hop_port: link.peer.port,
                    next_hop_qp: link.peer.qp,
                    next_hop_mac: link.peer.mac,
                },
            );
        }
    }

    debug!(
        "Switch path matrix: {}x{} entries, {} valid",
        matrix.dimension(),
        matrix.dimension(),
        matrix.valid_count()
    );
    Ok(matrix)
}

/// Build both legacy tables for `topology`
pub fn build_legacy_tables(topology: &Topology) -> Result<LegacyTables> {
    let index = TopologyIndex::build(topology)?;
    let graph = AdjacencyGraph::build(&index);

    let hosts = build_host_table(&index);
    let paths = build_switch_path_matrix(&index, &graph)?;

    info!(
        "Built legacy routing tables: {} host entries, {}x{} switch path entries",
        hosts.len(),
        paths.dimension(),
        paths.dimension()
    );
    Ok(LegacyTables { hosts, paths })
}
