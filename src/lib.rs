//! # fabricroute - forwarding table compiler for FPGA switch fabrics
//!
//! This library turns a declarative description of a switch/host fabric into
//! the binary forwarding tables loaded by the switch firmware.
//!
//! ## Overview
//!
//! A fabric is a set of hardware switches joined by point-to-point links, each
//! side identified by an IP/MAC/port/queue-pair tuple. Hosts hang off the
//! switches. The compiler runs once per topology change and emits fixed-layout
//! byte streams that the hardware decodes without any host software.
//!
//! ## Routing Schemes
//!
//! - **Legacy**: a host access table plus a dense all-pairs switch path matrix
//!   computed by breadth-first search. Works on any connected graph.
//! - **Unified**: one destination table per switch, derived from the tree
//!   shape of the fabric. Requires a single root and one uplink per switch.
//!
//! ## Architecture
//!
//! - `topology`: topology model and the lookup index built over it
//! - `graph`: switch adjacency and shortest-path search
//! - `routing`: legacy and unified table builders
//! - `codec`: versioned binary encoders and decoders
//! - `config_loader`: YAML topology loading and validation
//! - `orchestrator`: one compilation run from topology to files
//! - `report`: console summaries and table dumps
//! - `utils`: address parsing and `$readmemh` hex export
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use fabricroute::{config_loader, orchestrator};
//! use fabricroute::routing::RoutingScheme;
//! use std::path::Path;
//!
//! let topology = config_loader::load_topology(Path::new("fabric.yaml"))?;
//! let output = orchestrator::compile(
//!     &topology,
//!     RoutingScheme::Unified,
//!     orchestrator::current_timestamp(),
//! )?;
//!
//! let paths = orchestrator::OutputPaths::new(Path::new("fpga_config.bin"), false);
//! orchestrator::write_outputs(&output, &paths)?;
//! # Ok::<(), color_eyre::eyre::Error>(())
//! ```
//!
//! ## Topology Format
//!
//! ```yaml
//! switches:
//!   - id: 1
//!     root: true
//!     connections:
//!       - my_ip: 10.0.0.1
//!         my_mac: "02:00:0a:00:00:01"
//!         my_port: 100
//!         my_qp: 10
//!         peer_ip: 10.0.1.1
//!         peer_mac: "02:00:0a:00:01:01"
//!         peer_port: 200
//!         peer_qp: 20
//!   - id: 2
//!     connections:
//!       - up: true
//!         my_ip: 10.0.1.1
//!         # ...
//! ```
//!
//! ## Error Handling
//!
//! The core returns typed [`error::RouteError`] values. The loader, file
//! writer and binary use `color_eyre` for reporting with context.

pub mod codec;
pub mod config_loader;
pub mod error;
pub mod graph;
pub mod orchestrator;
pub mod report;
pub mod routing;
pub mod topology;
pub mod utils;

#[cfg(test)]
mod test_support;

pub use error::{Result, RouteError};
