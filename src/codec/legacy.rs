//! Encoder and decoder for the legacy host table and switch path matrix.

use std::io::{self, Cursor};

use log::debug;

use super::layout::*;
use crate::error::{Result, RouteError};
use crate::routing::{HostEntry, LegacyTables, SwitchPathEntry, SwitchPathMatrix};
use crate::utils::MacAddr;

/// Encoded legacy tables, kept apart so callers can inspect either half
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyImage {
    pub host_table: Vec<u8>,
    pub switch_paths: Vec<u8>,
}

impl LegacyImage {
    /// Routing file contents: host table immediately followed by the matrix
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.host_table.len() + self.switch_paths.len());
        out.extend_from_slice(&self.host_table);
        out.extend_from_slice(&self.switch_paths);
        out
    }
}

pub fn encode_legacy(tables: &LegacyTables, version: FormatVersion) -> Result<LegacyImage> {
    match version {
        FormatVersion::V1 => Ok(LegacyImage {
            host_table: encode_host_table_v1(&tables.hosts)?,
            switch_paths: encode_switch_paths_v1(&tables.paths)?,
        }),
    }
}

fn encode_host_table_v1(hosts: &[HostEntry]) -> Result<Vec<u8>> {
    let count = narrow_u32(hosts.len(), "host count")?;
    let expected = HOST_HEADER_SIZE + hosts.len() * HOST_ENTRY_SIZE;
    let mut buf = Vec::with_capacity(expected);

    put_u32(&mut buf, HOST_TABLE_MAGIC)?;
    put_u32(&mut buf, count)?;
    put_zeros(&mut buf, 8)?;

    for host in hosts {
        put_ip(&mut buf, host.host_ip)?;
        put_u32(&mut buf, host.switch_id)?;
        put_ip(&mut buf, host.switch_ip)?;
        put_u16(&mut buf, host.port)?;
        put_u16(&mut buf, host.qp)?;
        put_mac(&mut buf, host.mac)?;
        put_zeros(&mut buf, 10)?;
    }

    check_len(&buf, expected, "host table")?;
    debug!("Encoded host table: {} entries, {} bytes", count, buf.len());
    Ok(buf)
}

fn encode_switch_paths_v1(paths: &SwitchPathMatrix) -> Result<Vec<u8>> {
    let entries = paths.entries();
    let expected = SWITCH_PATH_HEADER_SIZE + entries.len() * SWITCH_PATH_ENTRY_SIZE;
    let mut buf = Vec::new();
    buf.try_reserve_exact(expected).map_err(|e| {
        RouteError::ResourceExhausted(format!(
            "cannot allocate {} bytes for switch path matrix: {}",
            expected, e
        ))
    })?;

    put_u32(&mut buf, SWITCH_PATH_MAGIC)?;
    put_u32(&mut buf, paths.switch_count())?;
    put_u32(&mut buf, paths.max_switch_id())?;
    put_zeros(&mut buf, 4)?;

    for entry in entries {
        if !entry.valid {
            put_zeros(&mut buf, SWITCH_PATH_ENTRY_SIZE)?;
            continue;
        }
        put_flag(&mut buf, true)?;
        put_u8(&mut buf, narrow_u8(entry.next_hop_switch_id, "next hop switch id")?)?;
        put_u16(&mut buf, entry.out_port)?;
        put_u16(&mut buf, entry.out_qp)?;
        put_u8(&mut buf, narrow_u8(entry.distance, "distance")?)?;
        put_u8(&mut buf, 0)?;
        put_ip(&mut buf, entry.next_hop_ip)?;
        put_u16(&mut buf, entry.next_hop_port)?;
        put_u16(&mut buf, entry.next_hop_qp)?;
    }

    check_len(&buf, expected, "switch path matrix")?;
    debug!(
        "Encoded switch path matrix: {}x{} entries, {} bytes",
        paths.dimension(),
        paths.dimension(),
        buf.len()
    );
    Ok(buf)
}

/// Decode a routing file written by [`encode_legacy`].
///
/// The matrix layout has no room for next-hop MACs; decoded path entries
/// carry a zero MAC.
pub fn decode_legacy(bytes: &[u8]) -> Result<LegacyTables> {
    let mut r = Cursor::new(bytes);
    let hosts = read_host_table(&mut r).map_err(decode_error)?;
    let (switch_count, max_switch_id, entries) = read_switch_paths(&mut r).map_err(decode_error)?;
    if remaining(&r) != 0 {
        return Err(RouteError::DecodingFailed(format!(
            "{} trailing bytes after switch path matrix",
            remaining(&r)
        )));
    }
    let paths = SwitchPathMatrix::from_entries(switch_count, max_switch_id, entries)?;
    Ok(LegacyTables { hosts, paths })
}

fn read_host_table(r: &mut Reader<'_>) -> io::Result<Vec<HostEntry>> {
    expect_magic(r, HOST_TABLE_MAGIC)?;
    let count = get_u32(r)? as usize;
    skip(r, 8)?;
    if remaining(r) < count.saturating_mul(HOST_ENTRY_SIZE) {
        return Err(io::ErrorKind::UnexpectedEof.into());
    }

    let mut hosts = Vec::with_capacity(count);
    for _ in 0..count {
        let host_ip = get_ip(r)?;
        let switch_id = get_u32(r)?;
        let switch_ip = get_ip(r)?;
        let port = get_u16(r)?;
        let qp = get_u16(r)?;
        let mac = get_mac(r)?;
        skip(r, 10)?;
        hosts.push(HostEntry { host_ip, switch_id, switch_ip, port, qp, mac });
    }
    Ok(hosts)
}

fn read_switch_paths(r: &mut Reader<'_>) -> io::Result<(u32, u32, Vec<SwitchPathEntry>)> {
    expect_magic(r, SWITCH_PATH_MAGIC)?;
    let switch_count = get_u32(r)?;
    let max_switch_id = get_u32(r)?;
    skip(r, 4)?;

    let dimension = max_switch_id as usize + 1;
    let total = dimension.saturating_mul(dimension);
    if remaining(r) < total.saturating_mul(SWITCH_PATH_ENTRY_SIZE) {
        return Err(io::ErrorKind::UnexpectedEof.into());
    }

    let mut entries = Vec::with_capacity(total);
    for _ in 0..total {
        let valid = get_flag(r)?;
        let next_hop_switch_id = u32::from(get_u8(r)?);
        let out_port = get_u16(r)?;
        let out_qp = get_u16(r)?;
        let distance = u32::from(get_u8(r)?);
        skip(r, 1)?;
        let next_hop_ip = get_ip(r)?;
        let next_hop_port = get_u16(r)?;
        let next_hop_qp = get_u16(r)?;
        entries.push(SwitchPathEntry {
            valid,
            next_hop_switch_id,
            out_port,
            out_qp,
            distance,
            next_hop_ip,
            next_hop_port,
            next_hop_qp,
            next_hop_mac: MacAddr::default(),
        });
    }
    Ok((switch_count, max_switch_id, entries))
}
