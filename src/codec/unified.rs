//! Encoder and decoder for unified destination tables.
//!
//! A routing file is every switch's table back to back, each with its own
//! `DEST` header, in switch declaration order.

use std::io::{self, Cursor};

use log::debug;

use super::layout::*;
use crate::error::{Result, RouteError};
use crate::routing::{DestEntry, DestTable};

pub fn encode_unified(tables: &[DestTable], version: FormatVersion) -> Result<Vec<u8>> {
    match version {
        FormatVersion::V1 => {
            let mut out = Vec::new();
            for table in tables {
                out.extend_from_slice(&encode_dest_table_v1(table)?);
            }
            Ok(out)
        }
    }
}

fn encode_dest_table_v1(table: &DestTable) -> Result<Vec<u8>> {
    let count = narrow_u32(table.entries.len(), "destination entry count")?;
    let expected = DEST_HEADER_SIZE + table.entries.len() * DEST_ENTRY_SIZE;
    let mut buf = Vec::with_capacity(expected);

    put_u32(&mut buf, DEST_TABLE_MAGIC)?;
    put_u32(&mut buf, count)?;
    put_u32(&mut buf, table.switch_id)?;
    put_zeros(&mut buf, 4)?;

    for entry in &table.entries {
        put_ip(&mut buf, entry.dst_ip)?;
        put_flag(&mut buf, entry.valid)?;
        put_flag(&mut buf, entry.is_direct_host)?;
        put_flag(&mut buf, entry.is_broadcast)?;
        put_u8(&mut buf, 0)?;
        put_u16(&mut buf, entry.out_port)?;
        put_u16(&mut buf, entry.out_qp)?;
        put_ip(&mut buf, entry.next_hop_ip)?;
        put_u16(&mut buf, entry.next_hop_port)?;
        put_u16(&mut buf, entry.next_hop_qp)?;
        put_mac(&mut buf, entry.next_hop_mac)?;
        put_zeros(&mut buf, 6)?;
    }

    check_len(&buf, expected, "destination table")?;
    debug!(
        "Encoded destination table for switch {}: {} entries, {} bytes",
        table.switch_id,
        count,
        buf.len()
    );
    Ok(buf)
}

/// Split a routing file back into per-switch tables
pub fn decode_unified(bytes: &[u8]) -> Result<Vec<DestTable>> {
    let mut r = Cursor::new(bytes);
    let mut tables = Vec::new();
    while remaining(&r) > 0 {
        let table = read_dest_table(&mut r).map_err(decode_error).map_err(|e| match e {
            RouteError::DecodingFailed(msg) => {
                RouteError::DecodingFailed(format!("table {}: {}", tables.len(), msg))
            }
            other => other,
        })?;
        tables.push(table);
    }
    Ok(tables)
}

fn read_dest_table(r: &mut Reader<'_>) -> io::Result<DestTable> {
    expect_magic(r, DEST_TABLE_MAGIC)?;
    let count = get_u32(r)? as usize;
    let switch_id = get_u32(r)?;
    skip(r, 4)?;
    if remaining(r) < count.saturating_mul(DEST_ENTRY_SIZE) {
        return Err(io::ErrorKind::UnexpectedEof.into());
    }

    let mut entries = Vec::with_capacity(count);
    for _ in 0..count {
        let dst_ip = get_ip(r)?;
        let valid = get_flag(r)?;
        let is_direct_host = get_flag(r)?;
        let is_broadcast = get_flag(r)?;
        skip(r, 1)?;
        let out_port = get_u16(r)?;
        let out_qp = get_u16(r)?;
        let next_hop_ip = get_ip(r)?;
        let next_hop_port = get_u16(r)?;
        let next_hop_qp = get_u16(r)?;
        let next_hop_mac = get_mac(r)?;
        skip(r, 6)?;
        entries.push(DestEntry {
            dst_ip,
            valid,
            is_direct_host,
            is_broadcast,
            out_port,
            out_qp,
            next_hop_ip,
            next_hop_port,
            next_hop_qp,
            next_hop_mac,
        });
    }
    Ok(DestTable { switch_id, entries })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::build_unified_tables;
    use crate::test_support::{deep_tree_topology, tree_topology};
    use std::net::Ipv4Addr;

    fn u32_at(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
    }

    fn u16_at(bytes: &[u8], offset: usize) -> u16 {
        u16::from_le_bytes(bytes[offset..offset + 2].try_into().unwrap())
    }

    #[test]
    fn test_stream_length_and_headers() {
        let tables = build_unified_tables(&tree_topology()).unwrap();
        let bytes = encode_unified(&tables, FormatVersion::V1).unwrap();
        let table_len = DEST_HEADER_SIZE + 2 * DEST_ENTRY_SIZE;
        assert_eq!(bytes.len(), 3 * table_len);

        for (i, id) in [1u32, 2, 3].iter().enumerate() {
            let header = &bytes[i * table_len..];
            assert_eq!(&header[0..4], b"TSED");
            assert_eq!(u32_at(header, 4), 2);
            assert_eq!(u32_at(header, 8), *id);
            assert_eq!(u32_at(header, 12), 0);
        }
    }

    #[test]
    fn test_direct_entry_layout() {
        let tables = build_unified_tables(&tree_topology()).unwrap();
        let bytes = encode_unified(&tables[1..2], FormatVersion::V1).unwrap();

        // Switch 2, first entry: directly attached host 192.168.1.10
        let entry = &bytes[DEST_HEADER_SIZE..DEST_HEADER_SIZE + DEST_ENTRY_SIZE];
        assert_eq!(u32_at(entry, 0), u32::from(Ipv4Addr::new(192, 168, 1, 10)));
        assert_eq!(&entry[4..8], &[1, 1, 0, 0]);
        assert_eq!(u16_at(entry, 8), 201);
        assert_eq!(u16_at(entry, 10), 21);
        assert_eq!(u32_at(entry, 12), u32::from(Ipv4Addr::new(192, 168, 1, 10)));
        assert_eq!(u16_at(entry, 16), 4791);
        assert_eq!(u16_at(entry, 18), 1);
        assert_eq!(&entry[20..26], &[0x0a, 0x01, 0xa8, 0xc0, 0x00, 0x02]);
        assert!(entry[26..32].iter().all(|&b| b == 0));

        // Second entry goes up to the root
        let entry = &bytes[DEST_HEADER_SIZE + DEST_ENTRY_SIZE..];
        assert_eq!(&entry[4..8], &[1, 0, 0, 0]);
        assert_eq!(u16_at(entry, 8), 200);
        assert_eq!(u32_at(entry, 12), u32::from(Ipv4Addr::new(10, 0, 0, 1)));
    }

    #[test]
    fn test_roundtrip_preserves_tables() {
        let tables = build_unified_tables(&deep_tree_topology()).unwrap();
        let bytes = encode_unified(&tables, FormatVersion::CURRENT).unwrap();
        assert_eq!(decode_unified(&bytes).unwrap(), tables);
    }

    #[test]
    fn test_empty_input_encodes_to_nothing() {
        assert!(encode_unified(&[], FormatVersion::V1).unwrap().is_empty());
        assert!(decode_unified(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_bad_magic_names_table() {
        let tables = build_unified_tables(&tree_topology()).unwrap();
        let mut bytes = encode_unified(&tables, FormatVersion::V1).unwrap();
        let second = DEST_HEADER_SIZE + 2 * DEST_ENTRY_SIZE;
        bytes[second] ^= 0xff;
        match decode_unified(&bytes) {
            Err(RouteError::DecodingFailed(msg)) => assert!(msg.starts_with("table 1"), "{}", msg),
            other => panic!("expected decode failure, got {:?}", other),
        }
    }
}
