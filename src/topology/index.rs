//! Lookup maps over a [`Topology`].
//!
//! Every builder needs the same questions answered: which switch owns an IP,
//! where a switch id sits in declaration order, what a link's far side is.
//! The index answers them from maps built once per build pass, and parses
//! every declared address up front so later stages never see a bad string.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::net::Ipv4Addr;

use log::{debug, warn};

use super::types::{Direction, Endpoint, Switch, Topology};
use crate::error::{Result, RouteError};
use crate::utils::address::{parse_ipv4, parse_mac, MacAddr};

/// Parsed form of an [`Endpoint`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedEndpoint {
    pub ip: Ipv4Addr,
    pub mac: MacAddr,
    pub port: u16,
    pub qp: u16,
}

impl ResolvedEndpoint {
    fn parse(endpoint: &Endpoint) -> Result<Self> {
        Ok(Self {
            ip: parse_ipv4(&endpoint.ip)?,
            mac: parse_mac(&endpoint.mac)?,
            port: endpoint.port,
            qp: endpoint.qp,
        })
    }
}

fn in_context(err: RouteError, context: String) -> RouteError {
    match err {
        RouteError::MalformedTopology(msg) => RouteError::malformed(format!("{}: {}", context, msg)),
        other => other,
    }
}

/// What sits at the far end of a link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Peer {
    /// Another switch (or the declaring switch itself), by contiguous index
    Switch(usize),
    Host,
}

/// A declared connection with parsed endpoints and a resolved peer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    pub direction: Direction,
    pub host_id: Option<u32>,
    pub local: ResolvedEndpoint,
    pub peer: ResolvedEndpoint,
    pub peer_kind: Peer,
}

impl Link {
    pub fn peer_switch(&self) -> Option<usize> {
        match self.peer_kind {
            Peer::Switch(idx) => Some(idx),
            Peer::Host => None,
        }
    }

    pub fn is_host_link(&self) -> bool {
        self.peer_kind == Peer::Host
    }
}

/// A host and the single link that reaches it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostAttachment {
    pub ip: Ipv4Addr,
    /// Contiguous index of the attaching switch
    pub switch: usize,
    /// Position of the host link among the attaching switch's links
    pub link: usize,
}

/// Lookup maps built once per build pass.
///
/// Switches are addressed internally by their contiguous index (declaration
/// order); external switch ids are only used at the edges.
#[derive(Debug)]
pub struct TopologyIndex<'a> {
    switches: &'a [Switch],
    id_to_index: HashMap<u32, usize>,
    ip_to_switch: HashMap<Ipv4Addr, usize>,
    links: Vec<Vec<Link>>,
    hosts: Vec<HostAttachment>,
    host_by_ip: HashMap<Ipv4Addr, usize>,
}

impl<'a> TopologyIndex<'a> {
    pub fn build(topology: &'a Topology) -> Result<Self> {
        let switches = topology.switches.as_slice();

        let mut id_to_index = HashMap::with_capacity(switches.len());
        for (idx, switch) in switches.iter().enumerate() {
            if id_to_index.insert(switch.id, idx).is_some() {
                return Err(RouteError::malformed(format!("duplicate switch id {}", switch.id)));
            }
        }

        // A switch owns every IP it declares on its local side
        let mut ip_to_switch = HashMap::new();
        let mut parsed = Vec::with_capacity(switches.len());
        for (idx, switch) in switches.iter().enumerate() {
            let mut endpoints = Vec::with_capacity(switch.connections.len());
            for conn in &switch.connections {
                let local = ResolvedEndpoint::parse(&conn.local)
                    .map_err(|e| in_context(e, format!("switch {} local endpoint", switch.id)))?;
                let peer = ResolvedEndpoint::parse(&conn.peer)
                    .map_err(|e| in_context(e, format!("switch {} peer endpoint", switch.id)))?;

                match ip_to_switch.entry(local.ip) {
                    Entry::Vacant(slot) => {
                        slot.insert(idx);
                    }
                    Entry::Occupied(owner) if *owner.get() != idx => {
                        return Err(RouteError::malformed(format!(
                            "IP {} declared by switches {} and {}",
                            local.ip,
                            switches[*owner.get()].id,
                            switch.id
                        )));
                    }
                    Entry::Occupied(_) => {}
                }
                endpoints.push((conn, local, peer));
            }
            parsed.push(endpoints);
        }

        let links: Vec<Vec<Link>> = parsed
            .into_iter()
            .map(|endpoints| {
                endpoints
                    .into_iter()
                    .map(|(conn, local, peer)| Link {
                        direction: conn.direction,
                        host_id: conn.host_id,
                        local,
                        peer,
                        peer_kind: ip_to_switch
                            .get(&peer.ip)
                            .map_or(Peer::Host, |&idx| Peer::Switch(idx)),
                    })
                    .collect()
            })
            .collect();

        let mut hosts: Vec<HostAttachment> = Vec::new();
        let mut host_by_ip: HashMap<Ipv4Addr, usize> = HashMap::new();
        for (idx, switch_links) in links.iter().enumerate() {
            for (link_idx, link) in switch_links.iter().enumerate() {
                if !link.is_host_link() {
                    continue;
                }
                if let Some(&pos) = host_by_ip.get(&link.peer.ip) {
                    let first = switches[hosts[pos].switch].id;
                    warn!(
                        "Host {} is attached to switch {} and again to switch {}; using switch {}",
                        link.peer.ip, first, switches[idx].id, first
                    );
                    continue;
                }
                host_by_ip.insert(link.peer.ip, hosts.len());
                hosts.push(HostAttachment { ip: link.peer.ip, switch: idx, link: link_idx });
            }
        }

        debug!(
            "Indexed {} switches, {} switch addresses, {} hosts",
            switches.len(),
            ip_to_switch.len(),
            hosts.len()
        );

        Ok(Self { switches, id_to_index, ip_to_switch, links, hosts, host_by_ip })
    }

    pub fn len(&self) -> usize {
        self.switches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.switches.is_empty()
    }

    pub fn switch(&self, idx: usize) -> &'a Switch {
        &self.switches[idx]
    }

    pub fn id(&self, idx: usize) -> u32 {
        self.switches[idx].id
    }

    pub fn index_of(&self, id: u32) -> Option<usize> {
        self.id_to_index.get(&id).copied()
    }

    /// Switch owning `ip` as one of its local addresses
    pub fn switch_by_ip(&self, ip: Ipv4Addr) -> Option<usize> {
        self.ip_to_switch.get(&ip).copied()
    }

    pub fn links(&self, idx: usize) -> &[Link] {
        &self.links[idx]
    }

    /// Every host in first-declared order, one attachment per host IP
    pub fn hosts(&self) -> &[HostAttachment] {
        &self.hosts
    }

    pub fn host(&self, ip: Ipv4Addr) -> Option<&HostAttachment> {
        self.host_by_ip.get(&ip).map(|&pos| &self.hosts[pos])
    }

    /// The first root-flagged switch
    pub fn root(&self) -> Option<usize> {
        self.switches.iter().position(|s| s.root)
    }

    pub fn max_switch_id(&self) -> Option<u32> {
        self.switches.iter().map(|s| s.id).max()
    }

    /// First link of `from` whose peer is the switch `to`
    pub fn link_to_switch(&self, from: usize, to: usize) -> Option<&Link> {
        self.links[from].iter().find(|l| l.peer_switch() == Some(to))
    }
}
