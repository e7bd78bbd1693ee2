//! Console reports for summary mode and the end of a run.
//!
//! Everything here renders to a `String`; the caller decides where it goes.

use crate::error::Result;
use crate::orchestrator::{CompiledOutput, OutputPaths};
use crate::routing::{DestTable, LegacyTables};
use crate::topology::{Topology, TopologyIndex};

fn render(lines: Vec<String>) -> String {
    let mut content = lines.join("\n");
    content.push('\n');
    content
}

/// Switch and host overview of a topology
pub fn topology_summary(topology: &Topology) -> Result<String> {
    let index = TopologyIndex::build(topology)?;
    let mut lines: Vec<String> = Vec::new();

    let root = index.root().map_or_else(|| "none".to_string(), |idx| index.id(idx).to_string());
    lines.push("Topology summary:".to_string());
    lines.push(format!("  - Switches: {}", index.len()));
    lines.push(format!("  - Connections: {}", topology.connection_count()));
    lines.push(format!("  - Hosts: {}", index.hosts().len()));
    lines.push(format!("  - Root switch: {}", root));
    if let Some(max) = index.max_switch_id() {
        lines.push(format!("  - Max switch id: {}", max));
    }

    for idx in 0..index.len() {
        let links = index.links(idx);
        let uplinks = links.iter().filter(|l| l.direction.is_up()).count();
        let hosts = links.iter().filter(|l| l.is_host_link()).count();
        lines.push(format!(
            "    switch {}{}: {} links ({} up, {} to hosts)",
            index.id(idx),
            if index.switch(idx).root { " (root)" } else { "" },
            links.len(),
            uplinks,
            hosts
        ));
    }
    Ok(render(lines))
}

pub fn legacy_tables_report(tables: &LegacyTables) -> String {
    let mut lines: Vec<String> = Vec::new();
    lines.push(format!("Host access table ({} entries):", tables.hosts.len()));
    for host in &tables.hosts {
        lines.push(format!(
            "  {:<15} -> switch {} via {} port {} qp {} mac {}",
            host.host_ip, host.switch_id, host.switch_ip, host.port, host.qp, host.mac
        ));
    }

    let paths = &tables.paths;
    lines.push(format!(
        "Switch path matrix ({}x{}, {} valid):",
        paths.dimension(),
        paths.dimension(),
        paths.valid_count()
    ));
    for src in 0..=paths.max_switch_id() {
        for dst in 0..=paths.max_switch_id() {
            let Some(entry) = paths.get(src, dst).filter(|e| e.valid) else {
                continue;
            };
            lines.push(format!(
                "  {} -> {}: next hop {} ({}:{}) out port {} qp {} distance {}",
                src,
                dst,
                entry.next_hop_switch_id,
                entry.next_hop_ip,
                entry.next_hop_port,
                entry.out_port,
                entry.out_qp,
                entry.distance
            ));
        }
    }
    render(lines)
}

pub fn unified_tables_report(tables: &[DestTable]) -> String {
    let mut lines: Vec<String> = Vec::new();
    for table in tables {
        lines.push(format!("Switch {} ({} destinations):", table.switch_id, table.entries.len()));
        for entry in &table.entries {
            let kind = if entry.is_direct_host { "direct" } else { "forward" };
            lines.push(format!(
                "  {:<15} {:<7} out port {} qp {} -> {}:{} qp {} mac {}",
                entry.dst_ip,
                kind,
                entry.out_port,
                entry.out_qp,
                entry.next_hop_ip,
                entry.next_hop_port,
                entry.next_hop_qp,
                entry.next_hop_mac
            ));
        }
    }
    if lines.is_empty() {
        return String::new();
    }
    render(lines)
}

/// Files and sizes produced by a run
pub fn output_report(output: &CompiledOutput, paths: &OutputPaths) -> String {
    let mut lines: Vec<String> = Vec::new();
    lines.push(format!("Generated {} routing tables:", output.routing.scheme()));
    lines.push(format!(
        "  - Connection config: {} ({} bytes)",
        paths.connection_config.display(),
        output.connection_config.len()
    ));
    lines.push(format!(
        "  - Routing tables: {} ({} bytes)",
        paths.routing.display(),
        output.routing.to_bytes().len()
    ));
    if let Some((config_hex, routing_hex)) = &paths.hex {
        lines.push(format!("  - Hex images: {}, {}", config_hex.display(), routing_hex.display()));
    }
    render(lines)
}
