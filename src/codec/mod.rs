//! Binary encoding of forwarding tables and the connection config.
//!
//! Every stream is built field by field through explicit offset routines;
//! nothing relies on in-memory struct layout. See [`layout`] for the byte
//! order and magic conventions shared by all streams.

pub mod connections;
pub mod layout;
pub mod legacy;
pub mod unified;

pub use connections::{
    connection_entries, decode_connections, encode_connections, encode_topology_connections,
    ConnectionConfig, ConnectionEntry,
};
pub use layout::{FormatVersion, CONNECTION_TIMESTAMP_OFFSET};
pub use legacy::{decode_legacy, encode_legacy, LegacyImage};
pub use unified::{decode_unified, encode_unified};
