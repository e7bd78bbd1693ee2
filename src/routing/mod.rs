//! Forwarding table builders.
//!
//! Two independent schemes are provided. The legacy scheme handles arbitrary
//! connected graphs with a host access table and an all-pairs switch matrix;
//! the unified scheme gives every switch a single destination table and
//! requires a tree.

pub mod legacy;
pub mod unified;

use std::fmt;

pub use legacy::{build_legacy_tables, HostEntry, LegacyTables, SwitchPathEntry, SwitchPathMatrix};
pub use unified::{build_unified_tables, DestEntry, DestTable, TreeRouter};

/// Which table family to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoutingScheme {
    /// Host access table plus switch path matrix
    #[default]
    Legacy,
    /// One destination table per switch (tree fabrics only)
    Unified,
}

impl fmt::Display for RoutingScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Legacy => write!(f, "legacy two-level"),
            Self::Unified => write!(f, "unified"),
        }
    }
}
