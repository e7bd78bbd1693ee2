//! Connection config stream: a flat dump of every declared connection.
//!
//! The FPGA loads this alongside the routing tables to set up its queue
//! pairs. Entries follow switch declaration order, then connection order
//! within each switch.

use std::io::{self, Cursor};
use std::net::Ipv4Addr;

use log::debug;

use super::layout::*;
use crate::error::{Result, RouteError};
use crate::topology::{Direction, Topology, TopologyIndex};
use crate::utils::MacAddr;

/// One connection as it appears in the stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionEntry {
    pub switch_id: u32,
    /// 0 when the connection names no host
    pub host_id: u32,
    pub local_ip: Ipv4Addr,
    pub peer_ip: Ipv4Addr,
    pub local_port: u16,
    pub peer_port: u16,
    pub local_qp: u16,
    pub peer_qp: u16,
    pub up: bool,
    pub local_mac: MacAddr,
    pub peer_mac: MacAddr,
}

/// A decoded connection config stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub version: FormatVersion,
    pub timestamp: u32,
    pub entries: Vec<ConnectionEntry>,
}

/// Every declared connection of an indexed topology
pub fn connection_entries(index: &TopologyIndex<'_>) -> Vec<ConnectionEntry> {
    (0..index.len())
        .flat_map(|idx| {
            let switch_id = index.id(idx);
            index.links(idx).iter().map(move |link| ConnectionEntry {
                switch_id,
                host_id: link.host_id.unwrap_or(0),
                local_ip: link.local.ip,
                peer_ip: link.peer.ip,
                local_port: link.local.port,
                peer_port: link.peer.port,
                local_qp: link.local.qp,
                peer_qp: link.peer.qp,
                up: link.direction == Direction::Up,
                local_mac: link.local.mac,
                peer_mac: link.peer.mac,
            })
        })
        .collect()
}

/// Index `topology` and encode all of its connections
pub fn encode_topology_connections(
    topology: &Topology,
    timestamp: u32,
    version: FormatVersion,
) -> Result<Vec<u8>> {
    let index = TopologyIndex::build(topology)?;
    encode_connections(&connection_entries(&index), timestamp, version)
}

pub fn encode_connections(
    entries: &[ConnectionEntry],
    timestamp: u32,
    version: FormatVersion,
) -> Result<Vec<u8>> {
    match version {
        FormatVersion::V1 => encode_connections_v1(entries, timestamp),
    }
}

fn encode_connections_v1(entries: &[ConnectionEntry], timestamp: u32) -> Result<Vec<u8>> {
    let total = narrow_u32(entries.len(), "connection count")?;
    let expected = CONNECTION_HEADER_SIZE + entries.len() * CONNECTION_ENTRY_SIZE;
    let mut buf = Vec::with_capacity(expected);

    put_u32(&mut buf, CONNECTION_MAGIC)?;
    put_u32(&mut buf, FormatVersion::V1.number())?;
    put_u32(&mut buf, total)?;
    put_u32(&mut buf, timestamp)?;

    for entry in entries {
        put_u32(&mut buf, entry.switch_id)?;
        put_u32(&mut buf, entry.host_id)?;
        put_ip(&mut buf, entry.local_ip)?;
        put_ip(&mut buf, entry.peer_ip)?;
        put_u16(&mut buf, entry.local_port)?;
        put_u16(&mut buf, entry.peer_port)?;
        put_u16(&mut buf, entry.local_qp)?;
        put_u16(&mut buf, entry.peer_qp)?;
        put_flag(&mut buf, entry.up)?;
        put_zeros(&mut buf, 5)?;
        put_mac(&mut buf, entry.local_mac)?;
        put_mac(&mut buf, entry.peer_mac)?;
    }

    check_len(&buf, expected, "connection config")?;
    debug!("Encoded connection config: {} connections, {} bytes", total, buf.len());
    Ok(buf)
}

pub fn decode_connections(bytes: &[u8]) -> Result<ConnectionConfig> {
    let mut r = Cursor::new(bytes);
    let config = read_connections(&mut r).map_err(decode_error)?;
    if remaining(&r) != 0 {
        return Err(RouteError::DecodingFailed(format!(
            "{} trailing bytes after connection entries",
            remaining(&r)
        )));
    }
    Ok(config)
}

fn read_connections(r: &mut Reader<'_>) -> io::Result<ConnectionConfig> {
    expect_magic(r, CONNECTION_MAGIC)?;
    let number = get_u32(r)?;
    let version = FormatVersion::from_number(number).ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidData, format!("unknown format version {}", number))
    })?;
    let total = get_u32(r)? as usize;
    let timestamp = get_u32(r)?;
    if remaining(r) < total.saturating_mul(CONNECTION_ENTRY_SIZE) {
        return Err(io::ErrorKind::UnexpectedEof.into());
    }

    let mut entries = Vec::with_capacity(total);
    for _ in 0..total {
        let switch_id = get_u32(r)?;
        let host_id = get_u32(r)?;
        let local_ip = get_ip(r)?;
        let peer_ip = get_ip(r)?;
        let local_port = get_u16(r)?;
        let peer_port = get_u16(r)?;
        let local_qp = get_u16(r)?;
        let peer_qp = get_u16(r)?;
        let up = get_flag(r)?;
        skip(r, 5)?;
        let local_mac = get_mac(r)?;
        let peer_mac = get_mac(r)?;
        entries.push(ConnectionEntry {
            switch_id,
            host_id,
            local_ip,
            peer_ip,
            local_port,
            peer_port,
            local_qp,
            peer_qp,
            up,
            local_mac,
            peer_mac,
        });
    }
    Ok(ConnectionConfig { version, timestamp, entries })
}
