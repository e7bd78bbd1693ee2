//! Unified destination tables for tree fabrics.
//!
//! Each switch gets one table with an entry per host in the fabric. The tree
//! shape makes all-pairs search unnecessary: a switch either owns the host
//! link, is the root (and picks the child subtree holding the host), or sends
//! everything it does not own up its single uplink.

use std::net::Ipv4Addr;

use log::{debug, info};

use crate::error::{Result, RouteError};
use crate::topology::{Direction, HostAttachment, Link, Topology, TopologyIndex};
use crate::utils::MacAddr;

/// Forwarding decision for one destination host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DestEntry {
    pub dst_ip: Ipv4Addr,
    pub valid: bool,
    pub is_direct_host: bool,
    /// Reserved for group forwarding; never set by the tree builder
    pub is_broadcast: bool,
    pub out_port: u16,
    pub out_qp: u16,
    pub next_hop_ip: Ipv4Addr,
    pub next_hop_port: u16,
    pub next_hop_qp: u16,
    pub next_hop_mac: MacAddr,
}

impl DestEntry {
    fn via(dst_ip: Ipv4Addr, link: &Link, is_direct_host: bool) -> Self {
        Self {
            dst_ip,
            valid: true,
            is_direct_host,
            is_broadcast: false,
            out_port: link.local.port,
            out_qp: link.local.qp,
            next_hop_ip: link.peer.ip,
            next_hop_port: link.peer.port,
            next_hop_qp: link.peer.qp,
            next_hop_mac: link.peer.mac,
        }
    }
}

/// Destination table owned by one switch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestTable {
    pub switch_id: u32,
    pub entries: Vec<DestEntry>,
}

impl DestTable {
    pub fn entry(&self, dst_ip: Ipv4Addr) -> Option<&DestEntry> {
        self.entries.iter().find(|e| e.dst_ip == dst_ip)
    }
}

/// Parent relation of a tree topology, checked once up front
#[derive(Debug)]
pub struct TreeRouter<'i, 'a> {
    index: &'i TopologyIndex<'a>,
    root: usize,
    /// Uplink of every non-root switch; `None` only for the root
    uplinks: Vec<Option<&'i Link>>,
    /// Parent index of every non-root switch; `None` only for the root
    parents: Vec<Option<usize>>,
}

impl<'i, 'a> TreeRouter<'i, 'a> {
    /// Check the tree invariants and record each switch's parent.
    ///
    /// Fails with `MalformedTopology` unless there is exactly one root without
    /// an uplink and every other switch has exactly one uplink to another switch.
    pub fn new(index: &'i TopologyIndex<'a>) -> Result<Self> {
        let roots: Vec<usize> = (0..index.len()).filter(|&i| index.switch(i).root).collect();
        let root = match roots.as_slice() {
            [root] => *root,
            [] => return Err(RouteError::malformed("no root switch")),
            _ => {
                return Err(RouteError::malformed(format!(
                    "{} root switches, tree routing needs exactly one",
                    roots.len()
                )))
            }
        };

        let mut uplinks = Vec::with_capacity(index.len());
        let mut parents = Vec::with_capacity(index.len());
        for idx in 0..index.len() {
            let ups: Vec<&Link> = index
                .links(idx)
                .iter()
                .filter(|l| l.direction == Direction::Up)
                .collect();

            if idx == root {
                if !ups.is_empty() {
                    return Err(RouteError::malformed(format!(
                        "root switch {} declares {} uplinks",
                        index.id(idx),
                        ups.len()
                    )));
                }
                uplinks.push(None);
                parents.push(None);
                continue;
            }

            let uplink = match ups.as_slice() {
                [uplink] => *uplink,
                _ => {
                    return Err(RouteError::malformed(format!(
                        "switch {} declares {} uplinks, expected exactly one",
                        index.id(idx),
                        ups.len()
                    )))
                }
            };
            let parent = match uplink.peer_switch() {
                Some(parent) if parent != idx => parent,
                _ => {
                    return Err(RouteError::malformed(format!(
                        "uplink of switch {} points at {}, which is not another switch",
                        index.id(idx),
                        uplink.peer.ip
                    )))
                }
            };
            uplinks.push(Some(uplink));
            parents.push(Some(parent));
        }

        let router = Self { index, root, uplinks, parents };
        // Every switch must reach the root, even one with no hosts below it
        for idx in (0..index.len()).filter(|&idx| idx != root) {
            router.subtree_root(idx)?;
        }
        Ok(router)
    }

    pub fn root(&self) -> usize {
        self.root
    }

    pub fn parent(&self, idx: usize) -> Option<usize> {
        self.parents[idx]
    }

    /// Child of the root whose subtree contains `target`.
    ///
    /// Walks parent links upward; fails if the walk loops or never meets the root.
    pub fn subtree_root(&self, target: usize) -> Result<usize> {
        if target == self.root {
            return Err(RouteError::malformed(format!(
                "switch {} is the root and has no subtree",
                self.index.id(target)
            )));
        }

        let mut current = target;
        // A simple upward path visits each switch at most once
        for _ in 0..self.index.len() {
            match self.parents[current] {
                Some(parent) if parent == self.root => return Ok(current),
                Some(parent) => current = parent,
                None => break,
            }
        }

        Err(RouteError::malformed(format!(
            "switch {} does not reach root {} through its uplinks",
            self.index.id(target),
            self.index.id(self.root)
        )))
    }

    fn downlink(&self, from: usize, to: usize) -> Result<&'i Link> {
        self.index
            .links(from)
            .iter()
            .find(|l| l.direction == Direction::Down && l.peer_switch() == Some(to))
            .ok_or_else(|| {
                RouteError::malformed(format!(
                    "switch {} has no downlink to switch {}",
                    self.index.id(from),
                    self.index.id(to)
                ))
            })
    }

    fn entry_for(&self, switch: usize, host: &HostAttachment) -> Result<DestEntry> {
        if host.switch == switch {
            let link = &self.index.links(switch)[host.link];
            return Ok(DestEntry::via(host.ip, link, true));
        }

        if switch == self.root {
            let child = self.subtree_root(host.switch)?;
            let link = self.downlink(switch, child)?;
            return Ok(DestEntry::via(host.ip, link, false));
        }

        let uplink = self.uplinks[switch].ok_or_else(|| {
            RouteError::malformed(format!("switch {} has no uplink", self.index.id(switch)))
        })?;
        Ok(DestEntry::via(host.ip, uplink, false))
    }

    /// Destination table for the switch at `switch`
    pub fn build_table(&self, switch: usize) -> Result<DestTable> {
        let entries = self
            .index
            .hosts()
            .iter()
            .map(|host| self.entry_for(switch, host))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "Destination table for switch {}: {} entries, {} direct",
            self.index.id(switch),
            entries.len(),
            entries.iter().filter(|e| e.is_direct_host).count()
        );
        Ok(DestTable { switch_id: self.index.id(switch), entries })
    }

    /// Tables for every switch in declaration order
    pub fn build_all(&self) -> Result<Vec<DestTable>> {
        (0..self.index.len()).map(|idx| self.build_table(idx)).collect()
    }
}

/// Build one destination table per switch of a tree topology
pub fn build_unified_tables(topology: &Topology) -> Result<Vec<DestTable>> {
    let index = TopologyIndex::build(topology)?;
    let router = TreeRouter::new(&index)?;
    let tables = router.build_all()?;

    info!(
        "Built unified routing tables: {} switches x {} hosts",
        tables.len(),
        index.hosts().len()
    );
    Ok(tables)
}
