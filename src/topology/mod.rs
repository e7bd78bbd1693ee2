//! Fabric topology module.
//!
//! This module contains the topology model produced by the loader and the
//! lookup index every table builder works from.

pub mod index;
pub mod types;

// Re-export key types for easier access
pub use index::{HostAttachment, Link, Peer, ResolvedEndpoint, TopologyIndex};
pub use types::{Connection, Direction, Endpoint, Switch, Topology};
