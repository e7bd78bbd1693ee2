//! Compilation orchestrator.
//!
//! Coordinates one run from a loaded topology to the bytes on disk: build the
//! tables for the selected scheme, encode them next to the connection config,
//! derive output file names and persist everything in one step.

use crate::codec::{self, FormatVersion, LegacyImage};
use crate::error::Result;
use crate::routing::{build_legacy_tables, build_unified_tables, RoutingScheme};
use crate::topology::Topology;
use crate::utils::to_readmemh;
use chrono::Utc;
use color_eyre::eyre::WrapErr;
use log::{debug, info};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Encoded routing tables for one scheme
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingImage {
    Legacy(LegacyImage),
    Unified(Vec<u8>),
}

impl RoutingImage {
    pub fn scheme(&self) -> RoutingScheme {
        match self {
            Self::Legacy(_) => RoutingScheme::Legacy,
            Self::Unified(_) => RoutingScheme::Unified,
        }
    }

    /// Routing file contents
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Legacy(image) => image.to_bytes(),
            Self::Unified(bytes) => bytes.clone(),
        }
    }
}

/// Everything a run produces, held in memory until written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledOutput {
    pub routing: RoutingImage,
    pub connection_config: Vec<u8>,
}

/// Build and encode the routing tables of `scheme`
pub fn build_routing(topology: &Topology, scheme: RoutingScheme) -> Result<RoutingImage> {
    let version = FormatVersion::CURRENT;
    match scheme {
        RoutingScheme::Legacy => {
            let tables = build_legacy_tables(topology)?;
            Ok(RoutingImage::Legacy(codec::encode_legacy(&tables, version)?))
        }
        RoutingScheme::Unified => {
            let tables = build_unified_tables(topology)?;
            Ok(RoutingImage::Unified(codec::encode_unified(&tables, version)?))
        }
    }
}

/// Build every stream of a run. `timestamp` goes into the connection config header.
pub fn compile(topology: &Topology, scheme: RoutingScheme, timestamp: u32) -> Result<CompiledOutput> {
    info!("Compiling {} routing tables", scheme);
    let routing = build_routing(topology, scheme)?;
    let connection_config =
        codec::encode_topology_connections(topology, timestamp, FormatVersion::CURRENT)?;
    Ok(CompiledOutput { routing, connection_config })
}

/// Current time in unix seconds, saturated to the 32-bit header field
pub fn current_timestamp() -> u32 {
    u32::try_from(Utc::now().timestamp().max(0)).unwrap_or(u32::MAX)
}

/// `fpga_config.bin` -> `fpga_config_routing.bin`; no extension -> `<name>_routing.bin`
pub fn routing_filename(config_path: &Path) -> PathBuf {
    let stem = config_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = config_path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "bin".to_string());
    config_path.with_file_name(format!("{}_routing.{}", stem, ext))
}

pub fn hex_filename(path: &Path) -> PathBuf {
    path.with_extension("hex")
}

/// Where each stream of a run is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub connection_config: PathBuf,
    pub routing: PathBuf,
    /// Hex images of the two streams, in the same order
    pub hex: Option<(PathBuf, PathBuf)>,
}

impl OutputPaths {
    pub fn new(config_path: &Path, hex: bool) -> Self {
        let routing = routing_filename(config_path);
        let hex = hex.then(|| (hex_filename(config_path), hex_filename(&routing)));
        Self { connection_config: config_path.to_path_buf(), routing, hex }
    }
}

/// Write every stream of `output`.
///
/// Each stream is first written to a temporary file next to its target. The
/// targets are only replaced once every stream is staged, so a failed write
/// leaves existing outputs untouched.
pub fn write_outputs(output: &CompiledOutput, paths: &OutputPaths) -> color_eyre::Result<Vec<PathBuf>> {
    let routing_bytes = output.routing.to_bytes();

    let mut files: Vec<(&Path, Vec<u8>)> = vec![
        (paths.connection_config.as_path(), output.connection_config.clone()),
        (paths.routing.as_path(), routing_bytes.clone()),
    ];
    if let Some((config_hex, routing_hex)) = &paths.hex {
        files.push((config_hex.as_path(), to_readmemh(&output.connection_config).into_bytes()));
        files.push((routing_hex.as_path(), to_readmemh(&routing_bytes).into_bytes()));
    }

    let mut staged: Vec<(NamedTempFile, &Path)> = Vec::with_capacity(files.len());
    for (path, bytes) in &files {
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut temp = NamedTempFile::new_in(dir)
            .wrap_err_with(|| format!("Failed to stage {}", path.display()))?;
        temp.write_all(bytes)
            .and_then(|_| temp.as_file().sync_all())
            .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
        debug!("Staged {} bytes for {}", bytes.len(), path.display());
        staged.push((temp, *path));
    }

    let mut written: Vec<PathBuf> = Vec::with_capacity(staged.len());
    for (temp, path) in staged {
        temp.persist(path)
            .wrap_err_with(|| format!("Failed to replace {}", path.display()))?;
        written.push(path.to_path_buf());
    }

    info!("Wrote {} output files", written.len());
    Ok(written)
}
