//! Shared utilities: address parsing and hex image export.

pub mod address;
pub mod hex;

pub use address::{parse_ipv4, parse_mac, MacAddr};
pub use hex::to_readmemh;
