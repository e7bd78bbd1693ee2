use crate::error::RouteError;
use crate::topology::Topology;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::{info, warn};
use std::collections::HashSet;
use std::fs::File;
use std::path::Path;
use thiserror::Error;

/// Caller-side checks applied before a topology reaches the builders
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Topology declares no switches")]
    NoSwitches,
    #[error("Topology must have exactly one root switch, found {0}")]
    RootCount(usize),
    #[error("Switch id {0} is declared more than once")]
    DuplicateSwitchId(u32),
    #[error("Invalid connection on switch {switch}: {reason}")]
    InvalidConnection { switch: u32, reason: String },
}

/// Load, parse and validate a topology from a YAML file
pub fn load_topology(path: &Path) -> Result<Topology> {
    info!("Loading topology from: {:?}", path);

    if !path.exists() {
        return Err(RouteError::InputNotFound { path: path.to_path_buf() }.into());
    }

    let file = File::open(path).wrap_err_with(|| format!("Failed to open {}", path.display()))?;
    let topology: Topology = serde_yaml::from_reader(file)
        .wrap_err_with(|| format!("Failed to parse topology {}", path.display()))?;

    validate_topology(&topology)?;

    info!(
        "Loaded {} switches with {} connections",
        topology.switches.len(),
        topology.connection_count()
    );
    Ok(topology)
}

/// Parse a topology from YAML text without touching the file system
pub fn parse_topology(yaml: &str) -> Result<Topology> {
    let topology: Topology = serde_yaml::from_str(yaml).wrap_err("Failed to parse topology")?;
    validate_topology(&topology)?;
    Ok(topology)
}

pub fn validate_topology(topology: &Topology) -> std::result::Result<(), ValidationError> {
    if topology.switches.is_empty() {
        return Err(ValidationError::NoSwitches);
    }

    let roots = topology.roots().count();
    if roots != 1 {
        return Err(ValidationError::RootCount(roots));
    }

    let mut seen = HashSet::with_capacity(topology.switches.len());
    for switch in &topology.switches {
        if !seen.insert(switch.id) {
            return Err(ValidationError::DuplicateSwitchId(switch.id));
        }

        for conn in &switch.connections {
            if conn.local.ip.trim().is_empty() || conn.peer.ip.trim().is_empty() {
                return Err(ValidationError::InvalidConnection {
                    switch: switch.id,
                    reason: "my_ip and peer_ip must not be empty".to_string(),
                });
            }
            if conn.local.ip == conn.peer.ip {
                return Err(ValidationError::InvalidConnection {
                    switch: switch.id,
                    reason: format!("connection loops back to its own address {}", conn.local.ip),
                });
            }
        }

        if switch.connections.is_empty() {
            warn!("Switch {} declares no connections", switch.id);
        }
    }

    Ok(())
}
