//! Byte layout constants and field helpers shared by every table format.
//!
//! Format V1: all multi-byte integers little-endian, IPv4 addresses as their
//! numeric value, MAC addresses last octet first. Magics are ASCII tags read
//! as big-endian numbers (`HOST` = 0x484F5354) and written like any other
//! word, so they appear byte-reversed in a hex dump.

use std::io::{self, Cursor, Read, Write};
use std::net::Ipv4Addr;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{Result, RouteError};
use crate::utils::MacAddr;

pub const HOST_TABLE_MAGIC: u32 = 0x484F_5354; // "HOST"
pub const SWITCH_PATH_MAGIC: u32 = 0x5357_4348; // "SWCH"
pub const DEST_TABLE_MAGIC: u32 = 0x4445_5354; // "DEST"
pub const CONNECTION_MAGIC: u32 = 0x4647_5441; // "FGTA"

pub const HOST_HEADER_SIZE: usize = 16;
pub const HOST_ENTRY_SIZE: usize = 32;
pub const SWITCH_PATH_HEADER_SIZE: usize = 16;
pub const SWITCH_PATH_ENTRY_SIZE: usize = 16;
pub const DEST_HEADER_SIZE: usize = 16;
pub const DEST_ENTRY_SIZE: usize = 32;
pub const CONNECTION_HEADER_SIZE: usize = 16;
pub const CONNECTION_ENTRY_SIZE: usize = 42;

/// Offset of the generation timestamp in the connection config header
pub const CONNECTION_TIMESTAMP_OFFSET: usize = 12;

/// Table format revision.
///
/// A layout change is a new variant with its own magics, never a silent
/// reinterpretation of an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatVersion {
    #[default]
    V1,
}

impl FormatVersion {
    pub const CURRENT: Self = Self::V1;

    /// Value written into headers that carry an explicit version word
    pub fn number(self) -> u32 {
        match self {
            Self::V1 => 1,
        }
    }

    pub fn from_number(number: u32) -> Option<Self> {
        match number {
            1 => Some(Self::V1),
            _ => None,
        }
    }
}

pub(crate) type Writer = Vec<u8>;
pub(crate) type Reader<'b> = Cursor<&'b [u8]>;

pub(crate) fn put_u8(w: &mut Writer, value: u8) -> io::Result<()> {
    w.write_u8(value)
}

pub(crate) fn put_u16(w: &mut Writer, value: u16) -> io::Result<()> {
    w.write_u16::<LittleEndian>(value)
}

pub(crate) fn put_u32(w: &mut Writer, value: u32) -> io::Result<()> {
    w.write_u32::<LittleEndian>(value)
}

pub(crate) fn put_ip(w: &mut Writer, ip: Ipv4Addr) -> io::Result<()> {
    put_u32(w, u32::from(ip))
}

pub(crate) fn put_mac(w: &mut Writer, mac: MacAddr) -> io::Result<()> {
    w.write_all(&mac.to_wire())
}

pub(crate) fn put_flag(w: &mut Writer, flag: bool) -> io::Result<()> {
    put_u8(w, u8::from(flag))
}

pub(crate) fn put_zeros(w: &mut Writer, count: usize) -> io::Result<()> {
    w.write_all(&vec![0u8; count])
}

pub(crate) fn get_u8(r: &mut Reader<'_>) -> io::Result<u8> {
    r.read_u8()
}

pub(crate) fn get_u16(r: &mut Reader<'_>) -> io::Result<u16> {
    r.read_u16::<LittleEndian>()
}

pub(crate) fn get_u32(r: &mut Reader<'_>) -> io::Result<u32> {
    r.read_u32::<LittleEndian>()
}

pub(crate) fn get_ip(r: &mut Reader<'_>) -> io::Result<Ipv4Addr> {
    get_u32(r).map(Ipv4Addr::from)
}

pub(crate) fn get_mac(r: &mut Reader<'_>) -> io::Result<MacAddr> {
    let mut wire = [0u8; 6];
    r.read_exact(&mut wire)?;
    Ok(MacAddr::from_wire(wire))
}

pub(crate) fn get_flag(r: &mut Reader<'_>) -> io::Result<bool> {
    get_u8(r).map(|v| v != 0)
}

pub(crate) fn skip(r: &mut Reader<'_>, count: usize) -> io::Result<()> {
    let mut sink = vec![0u8; count];
    r.read_exact(&mut sink)
}

pub(crate) fn expect_magic(r: &mut Reader<'_>, expected: u32) -> io::Result<()> {
    let found = get_u32(r)?;
    if found != expected {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("bad magic 0x{:08X}, expected 0x{:08X}", found, expected),
        ));
    }
    Ok(())
}

pub(crate) fn remaining(r: &Reader<'_>) -> usize {
    r.get_ref().len().saturating_sub(r.position() as usize)
}

/// Narrow a value into a one-byte field
pub(crate) fn narrow_u8(value: u32, field: &str) -> Result<u8> {
    u8::try_from(value)
        .map_err(|_| RouteError::encoding(format!("{} {} does not fit in one byte", field, value)))
}

pub(crate) fn narrow_u32(value: usize, field: &str) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| RouteError::encoding(format!("{} {} does not fit in 32 bits", field, value)))
}

/// Check a finished buffer against its expected size
pub(crate) fn check_len(buf: &[u8], expected: usize, what: &str) -> Result<()> {
    if buf.len() != expected {
        return Err(RouteError::encoding(format!(
            "{} is {} bytes, layout requires {}",
            what,
            buf.len(),
            expected
        )));
    }
    Ok(())
}

pub(crate) fn decode_error(err: io::Error) -> RouteError {
    match err.kind() {
        io::ErrorKind::UnexpectedEof => RouteError::DecodingFailed("stream truncated".to_string()),
        _ => RouteError::DecodingFailed(err.to_string()),
    }
}
