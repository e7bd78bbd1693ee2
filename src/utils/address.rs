//! Address parsing helpers.
//!
//! Link endpoints arrive as dotted-quad IPv4 strings and colon-separated MAC
//! strings. Everything downstream of the topology index works on the parsed
//! forms defined here.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::error::{Result, RouteError};

/// Parse a dotted-quad IPv4 address
pub fn parse_ipv4(ip: &str) -> Result<Ipv4Addr> {
    ip.trim()
        .parse::<Ipv4Addr>()
        .map_err(|_| RouteError::malformed(format!("invalid IPv4 address '{}'", ip)))
}

/// Parse a MAC address in `aa:bb:cc:dd:ee:ff` form
pub fn parse_mac(mac: &str) -> Result<MacAddr> {
    mac.parse::<MacAddr>()
        .map_err(|reason| RouteError::malformed(format!("invalid MAC address '{}': {}", mac, reason)))
}

/// 48-bit Ethernet hardware address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MacAddr([u8; 6]);

impl MacAddr {
    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    /// Octets in transmission order
    pub fn octets(&self) -> [u8; 6] {
        self.0
    }

    /// Octets in table byte order: last octet first, so a 48-bit
    /// little-endian read of the field yields the address value.
    pub fn to_wire(&self) -> [u8; 6] {
        let mut wire = self.0;
        wire.reverse();
        wire
    }

    pub fn from_wire(mut wire: [u8; 6]) -> Self {
        wire.reverse();
        Self(wire)
    }
}

impl FromStr for MacAddr {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut octets = [0u8; 6];
        let mut parts = s.trim().split(':');

        for (i, octet) in octets.iter_mut().enumerate() {
            let part = parts
                .next()
                .ok_or_else(|| format!("expected 6 octets, found {}", i))?;
            if part.is_empty() || part.len() > 2 {
                return Err(format!("octet {} '{}' is not one or two hex digits", i, part));
            }
            *octet = u8::from_str_radix(part, 16)
                .map_err(|_| format!("octet {} '{}' is not hexadecimal", i, part))?;
        }

        if parts.next().is_some() {
            return Err("more than 6 octets".to_string());
        }

        Ok(Self(octets))
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let o = self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            o[0], o[1], o[2], o[3], o[4], o[5]
        )
    }
}
