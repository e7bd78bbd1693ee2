//! Topology type definitions.
//!
//! The model mirrors the YAML description one-to-one. Addresses are kept as
//! the declared strings; parsing happens once in [`TopologyIndex`].
//!
//! [`TopologyIndex`]: crate::topology::TopologyIndex

use serde::{Deserialize, Serialize};

/// Direction of a link relative to the switch that declares it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "bool", into = "bool")]
pub enum Direction {
    /// Toward the parent switch
    Up,
    /// Toward a child switch or a host
    #[default]
    Down,
}

impl Direction {
    pub fn is_up(self) -> bool {
        matches!(self, Self::Up)
    }
}

// The YAML format encodes direction as `up: true|false`
impl From<bool> for Direction {
    fn from(up: bool) -> Self {
        if up {
            Self::Up
        } else {
            Self::Down
        }
    }
}

impl From<Direction> for bool {
    fn from(direction: Direction) -> Self {
        direction.is_up()
    }
}

/// One side of a point-to-point link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub ip: String,
    pub mac: String,
    pub port: u16,
    pub qp: u16,
}

/// A link declared by a switch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ConnectionRecord", into = "ConnectionRecord")]
pub struct Connection {
    pub direction: Direction,
    pub host_id: Option<u32>,
    pub local: Endpoint,
    pub peer: Endpoint,
}

/// Flat on-disk form of a [`Connection`]
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConnectionRecord {
    #[serde(default)]
    up: Direction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    host_id: Option<u32>,
    my_ip: String,
    my_mac: String,
    my_port: u16,
    #[serde(default)]
    my_qp: u16,
    peer_ip: String,
    peer_mac: String,
    peer_port: u16,
    #[serde(default)]
    peer_qp: u16,
}

impl From<ConnectionRecord> for Connection {
    fn from(record: ConnectionRecord) -> Self {
        Self {
            direction: record.up,
            host_id: record.host_id,
            local: Endpoint {
                ip: record.my_ip,
                mac: record.my_mac,
                port: record.my_port,
                qp: record.my_qp,
            },
            peer: Endpoint {
                ip: record.peer_ip,
                mac: record.peer_mac,
                port: record.peer_port,
                qp: record.peer_qp,
            },
        }
    }
}

impl From<Connection> for ConnectionRecord {
    fn from(conn: Connection) -> Self {
        Self {
            up: conn.direction,
            host_id: conn.host_id,
            my_ip: conn.local.ip,
            my_mac: conn.local.mac,
            my_port: conn.local.port,
            my_qp: conn.local.qp,
            peer_ip: conn.peer.ip,
            peer_mac: conn.peer.mac,
            peer_port: conn.peer.port,
            peer_qp: conn.peer.qp,
        }
    }
}

/// A fabric switch and the links it declares
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Switch {
    pub id: u32,
    #[serde(default)]
    pub root: bool,
    #[serde(default)]
    pub connections: Vec<Connection>,
}

impl Switch {
    /// Links declared toward a parent switch (exactly one for a non-root switch in a tree)
    pub fn uplinks(&self) -> impl Iterator<Item = &Connection> {
        self.connections.iter().filter(|c| c.direction.is_up())
    }
}

/// Complete fabric description
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    #[serde(default)]
    pub switches: Vec<Switch>,
}

impl Topology {
    pub fn connection_count(&self) -> usize {
        self.switches.iter().map(|s| s.connections.len()).sum()
    }

    pub fn roots(&self) -> impl Iterator<Item = &Switch> {
        self.switches.iter().filter(|s| s.root)
    }

    pub fn max_switch_id(&self) -> Option<u32> {
        self.switches.iter().map(|s| s.id).max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_from_yaml() {
        let yaml = r#"
up: true
my_ip: 10.0.0.2
my_mac: "02:00:00:00:00:02"
my_port: 4791
my_qp: 7
peer_ip: 10.0.0.1
peer_mac: "02:00:00:00:00:01"
peer_port: 4792
peer_qp: 8
"#;
        let conn: Connection = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(conn.direction, Direction::Up);
        assert_eq!(conn.host_id, None);
        assert_eq!(conn.local.ip, "10.0.0.2");
        assert_eq!(conn.local.qp, 7);
        assert_eq!(conn.peer.port, 4792);
        assert_eq!(conn.peer.mac, "02:00:00:00:00:01");
    }

    #[test]
    fn test_direction_defaults_to_down() {
        let yaml = r#"
host_id: 4
my_ip: 10.0.0.1
my_mac: "02:00:00:00:00:01"
my_port: 1
peer_ip: 10.0.9.1
peer_mac: "02:00:00:00:09:01"
peer_port: 2
"#;
        let conn: Connection = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(conn.direction, Direction::Down);
        assert_eq!(conn.host_id, Some(4));
        assert_eq!(conn.local.qp, 0);
    }

    #[test]
    fn test_port_out_of_range_is_rejected() {
        let yaml = r#"
my_ip: 10.0.0.1
my_mac: "02:00:00:00:00:01"
my_port: 70000
peer_ip: 10.0.9.1
peer_mac: "02:00:00:00:09:01"
peer_port: 2
"#;
        assert!(serde_yaml::from_str::<Connection>(yaml).is_err());
    }

    #[test]
    fn test_topology_helpers() {
        let topology = Topology {
            switches: vec![
                Switch { id: 3, root: false, connections: vec![] },
                Switch { id: 7, root: true, connections: vec![] },
            ],
        };
        assert_eq!(topology.max_switch_id(), Some(7));
        assert_eq!(topology.roots().count(), 1);
        assert_eq!(topology.connection_count(), 0);
        assert_eq!(Topology::default().max_switch_id(), None);
    }
}
