#[cfg(test)]
mod fabric_compile_tests {
    use std::io::Write;
    use std::net::Ipv4Addr;
    use tempfile::NamedTempFile;

    use fabricroute::codec::{decode_connections, decode_legacy, decode_unified, CONNECTION_TIMESTAMP_OFFSET};
    use fabricroute::config_loader::{load_topology, ValidationError};
    use fabricroute::orchestrator::{compile, write_outputs, OutputPaths};
    use fabricroute::routing::RoutingScheme;
    use fabricroute::topology::Topology;
    use fabricroute::RouteError;

    /// Root R (1) with children A (2) and B (3); H1 on A, H2 on B
    const RAB_TOPOLOGY: &str = r#"
switches:
  - id: 1
    root: true
    connections:
      - my_ip: 10.0.0.1
        my_mac: "02:00:0a:00:00:01"
        my_port: 100
        my_qp: 10
        peer_ip: 10.0.1.1
        peer_mac: "02:00:0a:00:01:01"
        peer_port: 200
        peer_qp: 20
      - my_ip: 10.0.0.2
        my_mac: "02:00:0a:00:00:02"
        my_port: 101
        my_qp: 11
        peer_ip: 10.0.2.1
        peer_mac: "02:00:0a:00:02:01"
        peer_port: 300
        peer_qp: 30
  - id: 2
    connections:
      - up: true
        my_ip: 10.0.1.1
        my_mac: "02:00:0a:00:01:01"
        my_port: 200
        my_qp: 20
        peer_ip: 10.0.0.1
        peer_mac: "02:00:0a:00:00:01"
        peer_port: 100
        peer_qp: 10
      - host_id: 1
        my_ip: 10.0.1.2
        my_mac: "02:00:0a:00:01:02"
        my_port: 201
        my_qp: 21
        peer_ip: 192.168.1.10
        peer_mac: "52:54:00:00:01:0a"
        peer_port: 4791
        peer_qp: 1
  - id: 3
    connections:
      - up: true
        my_ip: 10.0.2.1
        my_mac: "02:00:0a:00:02:01"
        my_port: 300
        my_qp: 30
        peer_ip: 10.0.0.2
        peer_mac: "02:00:0a:00:00:02"
        peer_port: 101
        peer_qp: 11
      - host_id: 2
        my_ip: 10.0.2.2
        my_mac: "02:00:0a:00:02:02"
        my_port: 301
        my_qp: 31
        peer_ip: 192.168.2.10
        peer_mac: "52:54:00:00:02:0a"
        peer_port: 4791
        peer_qp: 2
"#;

    const H1: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 10);
    const H2: Ipv4Addr = Ipv4Addr::new(192, 168, 2, 10);

    fn load(yaml: &str) -> Topology {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", yaml).unwrap();
        load_topology(temp_file.path()).unwrap()
    }

    #[test]
    fn test_unified_three_switch_tree() {
        let topology = load(RAB_TOPOLOGY);
        let output = compile(&topology, RoutingScheme::Unified, 0).unwrap();
        let tables = decode_unified(&output.routing.to_bytes()).unwrap();
        assert_eq!(tables.len(), 3);

        // R: both hosts forwarded down to the owning child
        let r = &tables[0];
        assert_eq!(r.switch_id, 1);
        let to_h1 = r.entry(H1).unwrap();
        assert!(to_h1.valid && !to_h1.is_direct_host && !to_h1.is_broadcast);
        assert_eq!(to_h1.next_hop_ip, Ipv4Addr::new(10, 0, 1, 1));
        assert_eq!((to_h1.out_port, to_h1.out_qp), (100, 10));
        let to_h2 = r.entry(H2).unwrap();
        assert!(!to_h2.is_direct_host);
        assert_eq!(to_h2.next_hop_ip, Ipv4Addr::new(10, 0, 2, 1));
        assert_eq!((to_h2.out_port, to_h2.out_qp), (101, 11));

        // A: direct for H1, up to R for H2
        let a = &tables[1];
        let direct = a.entry(H1).unwrap();
        assert!(direct.is_direct_host);
        assert_eq!(direct.next_hop_ip, H1);
        assert_eq!((direct.next_hop_port, direct.next_hop_qp), (4791, 1));
        assert_eq!(direct.next_hop_mac.to_string(), "52:54:00:00:01:0a");
        let up = a.entry(H2).unwrap();
        assert!(!up.is_direct_host);
        assert_eq!(up.next_hop_ip, Ipv4Addr::new(10, 0, 0, 1));
        assert_eq!((up.out_port, up.out_qp), (200, 20));

        // B mirrors A
        let b = &tables[2];
        assert!(b.entry(H2).unwrap().is_direct_host);
        assert_eq!(b.entry(H1).unwrap().next_hop_ip, Ipv4Addr::new(10, 0, 0, 2));
    }

    #[test]
    fn test_legacy_chains_end_at_host_switch() {
        let topology = load(RAB_TOPOLOGY);
        let output = compile(&topology, RoutingScheme::Legacy, 0).unwrap();
        let tables = decode_legacy(&output.routing.to_bytes()).unwrap();

        for src in 1..=3u32 {
            for host in &tables.hosts {
                let expected = if src == host.switch_id {
                    0
                } else {
                    tables.paths.get(src, host.switch_id).unwrap().distance
                };

                let mut current = src;
                let mut hops = 0;
                while current != host.switch_id {
                    let entry = tables.paths.get(current, host.switch_id).unwrap();
                    assert!(entry.valid);
                    current = entry.next_hop_switch_id;
                    hops += 1;
                    assert!(hops <= 3, "path loops");
                }
                assert_eq!(hops, expected);
            }
        }
    }

    #[test]
    fn test_output_is_reproducible() {
        let topology = load(RAB_TOPOLOGY);
        let first = compile(&topology, RoutingScheme::Unified, 1_700_000_000).unwrap();
        let second = compile(&topology, RoutingScheme::Unified, 1_800_000_000).unwrap();

        assert_eq!(first.routing, second.routing);
        let mut a = first.connection_config.clone();
        let mut b = second.connection_config.clone();
        a[CONNECTION_TIMESTAMP_OFFSET..CONNECTION_TIMESTAMP_OFFSET + 4].fill(0);
        b[CONNECTION_TIMESTAMP_OFFSET..CONNECTION_TIMESTAMP_OFFSET + 4].fill(0);
        assert_eq!(a, b);

        let config = decode_connections(&first.connection_config).unwrap();
        assert_eq!(config.timestamp, 1_700_000_000);
        assert_eq!(config.entries.len(), 6);
        assert_eq!(config.entries[1].host_id, 0);
        assert_eq!(config.entries[3].host_id, 1);
    }

    #[test]
    fn test_write_outputs_to_directory() {
        let topology = load(RAB_TOPOLOGY);
        let dir = tempfile::tempdir().unwrap();
        let output = compile(&topology, RoutingScheme::Unified, 0).unwrap();
        let paths = OutputPaths::new(&dir.path().join("fpga_config.bin"), true);

        write_outputs(&output, &paths).unwrap();

        assert!(dir.path().join("fpga_config.bin").exists());
        assert!(dir.path().join("fpga_config_routing.bin").exists());
        let hex = std::fs::read_to_string(dir.path().join("fpga_config_routing.hex")).unwrap();
        assert_eq!(hex.lines().count(), output.routing.to_bytes().len() / 4);
        assert_eq!(hex.lines().next(), Some("44455354"));
    }

    #[test]
    fn test_cycle_rejected_by_unified_only() {
        // A links down to B, and B declares that link as a second uplink
        let mut topology = load(RAB_TOPOLOGY);
        let sibling: fabricroute::topology::Connection = serde_yaml::from_str(
            "my_ip: 10.0.1.3\nmy_mac: \"02:00:0a:00:01:03\"\nmy_port: 202\npeer_ip: 10.0.2.3\npeer_mac: \"02:00:0a:00:02:03\"\npeer_port: 302\n",
        )
        .unwrap();
        let back: fabricroute::topology::Connection = serde_yaml::from_str(
            "up: true\nmy_ip: 10.0.2.3\nmy_mac: \"02:00:0a:00:02:03\"\nmy_port: 302\npeer_ip: 10.0.1.3\npeer_mac: \"02:00:0a:00:01:03\"\npeer_port: 202\n",
        )
        .unwrap();
        topology.switches[1].connections.push(sibling);
        topology.switches[2].connections.push(back);

        let err = compile(&topology, RoutingScheme::Unified, 0).unwrap_err();
        assert!(matches!(err, RouteError::MalformedTopology(_)));
        assert!(compile(&topology, RoutingScheme::Legacy, 0).is_ok());
    }

    #[test]
    fn test_loader_rejects_two_roots() {
        let two_roots = RAB_TOPOLOGY.replace("  - id: 3\n", "  - id: 3\n    root: true\n");
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", two_roots).unwrap();

        let err = load_topology(temp_file.path()).unwrap_err();
        assert_eq!(err.downcast_ref::<ValidationError>(), Some(&ValidationError::RootCount(2)));
    }
}
