//! Topology fixtures shared by the unit tests.

use crate::topology::{Connection, Direction, Endpoint, Switch, Topology};

/// Locally administered MAC derived from an IPv4 string, e.g. `10.0.1.2` -> `02:00:0a:00:01:02`
pub(crate) fn mac_for(ip: &str) -> String {
    let octets: Vec<u8> = ip.split('.').map(|o| o.parse().unwrap()).collect();
    format!("02:00:{:02x}:{:02x}:{:02x}:{:02x}", octets[0], octets[1], octets[2], octets[3])
}

pub(crate) fn connection(
    up: bool,
    my_ip: &str,
    my_port: u16,
    my_qp: u16,
    peer_ip: &str,
    peer_port: u16,
    peer_qp: u16,
) -> Connection {
    Connection {
        direction: Direction::from(up),
        host_id: None,
        local: Endpoint { ip: my_ip.to_string(), mac: mac_for(my_ip), port: my_port, qp: my_qp },
        peer: Endpoint { ip: peer_ip.to_string(), mac: mac_for(peer_ip), port: peer_port, qp: peer_qp },
    }
}

pub(crate) fn switch_link(up: bool, my_ip: &str, peer_ip: &str) -> Connection {
    connection(up, my_ip, 1, 1, peer_ip, 2, 2)
}

pub(crate) fn host_link(my_ip: &str, host_ip: &str) -> Connection {
    connection(false, my_ip, 4791, 1, host_ip, 4791, 2)
}

/// Root 1 with children 2 and 3; host 192.168.1.10 on switch 2, host 192.168.2.10 on switch 3.
///
/// | link            | local port/qp | peer port/qp |
/// |-----------------|---------------|--------------|
/// | 1 -> 2          | 100/10        | 200/20       |
/// | 1 -> 3          | 101/11        | 300/30       |
/// | 2 -> 1 (up)     | 200/20        | 100/10       |
/// | 2 -> H1         | 201/21        | 4791/1       |
/// | 3 -> 1 (up)     | 300/30        | 101/11       |
/// | 3 -> H2         | 301/31        | 4791/2       |
pub(crate) fn tree_topology() -> Topology {
    Topology {
        switches: vec![
            Switch {
                id: 1,
                root: true,
                connections: vec![
                    connection(false, "10.0.0.1", 100, 10, "10.0.1.1", 200, 20),
                    connection(false, "10.0.0.2", 101, 11, "10.0.2.1", 300, 30),
                ],
            },
            Switch {
                id: 2,
                root: false,
                connections: vec![
                    connection(true, "10.0.1.1", 200, 20, "10.0.0.1", 100, 10),
                    connection(false, "10.0.1.2", 201, 21, "192.168.1.10", 4791, 1),
                ],
            },
            Switch {
                id: 3,
                root: false,
                connections: vec![
                    connection(true, "10.0.2.1", 300, 30, "10.0.0.2", 101, 11),
                    connection(false, "10.0.2.2", 301, 31, "192.168.2.10", 4791, 2),
                ],
            },
        ],
    }
}

/// Root 1, child 2, grandchildren 4 and 5 under 2, plus child 3 of the root.
/// Every switch except the root carries one host `192.168.<id>.10`.
pub(crate) fn deep_tree_topology() -> Topology {
    let sw = |id: u32, root: bool, connections: Vec<Connection>| Switch { id, root, connections };
    Topology {
        switches: vec![
            sw(1, true, vec![
                switch_link(false, "10.0.0.1", "10.0.2.1"),
                switch_link(false, "10.0.0.2", "10.0.3.1"),
            ]),
            sw(2, false, vec![
                switch_link(true, "10.0.2.1", "10.0.0.1"),
                switch_link(false, "10.0.2.2", "10.0.4.1"),
                switch_link(false, "10.0.2.3", "10.0.5.1"),
                host_link("10.0.2.4", "192.168.2.10"),
            ]),
            sw(3, false, vec![
                switch_link(true, "10.0.3.1", "10.0.0.2"),
                host_link("10.0.3.2", "192.168.3.10"),
            ]),
            sw(4, false, vec![
                switch_link(true, "10.0.4.1", "10.0.2.2"),
                host_link("10.0.4.2", "192.168.4.10"),
            ]),
            sw(5, false, vec![
                switch_link(true, "10.0.5.1", "10.0.2.3"),
                host_link("10.0.5.2", "192.168.5.10"),
            ]),
        ],
    }
}

/// Four switches in a ring 1-2-3-4-1, each with host `192.168.<id>.10`.
pub(crate) fn ring_topology() -> Topology {
    let switches = (1..=4u32)
        .map(|id| {
            let next = id % 4 + 1;
            let prev = (id + 2) % 4 + 1;
            Switch {
                id,
                root: id == 1,
                connections: vec![
                    switch_link(false, &format!("10.0.{}.1", id), &format!("10.0.{}.2", next)),
                    switch_link(false, &format!("10.0.{}.2", id), &format!("10.0.{}.1", prev)),
                    host_link(&format!("10.0.{}.3", id), &format!("192.168.{}.10", id)),
                ],
            }
        })
        .collect();
    Topology { switches }
}
