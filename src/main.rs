use clap::Parser;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use env_logger::Env;
use log::info;
use std::path::PathBuf;

use fabricroute::config_loader;
use fabricroute::orchestrator::{self, OutputPaths};
use fabricroute::report;
use fabricroute::routing::{build_legacy_tables, build_unified_tables, RoutingScheme};

/// Forwarding table compiler for FPGA switch fabrics
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the topology YAML file
    input: PathBuf,

    /// Connection config output; routing tables go next to it as <name>_routing.<ext>
    #[arg(default_value = "fpga_config.bin")]
    output: PathBuf,

    /// Build unified per-switch destination tables instead of the legacy pair
    #[arg(short, long)]
    unified: bool,

    /// Print the topology and routing tables without writing any file
    #[arg(short, long)]
    summary: bool,

    /// Also write $readmemh hex images of every stream
    #[arg(long)]
    hex: bool,

    /// Fixed generation timestamp (unix seconds) for reproducible output
    #[arg(long)]
    timestamp: Option<u32>,
}

impl Args {
    fn scheme(&self) -> RoutingScheme {
        if self.unified {
            RoutingScheme::Unified
        } else {
            RoutingScheme::Legacy
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    info!("Topology file: {:?}", args.input);
    info!("Routing scheme: {}", args.scheme());

    let topology = config_loader::load_topology(&args.input)?;

    if args.summary {
        print!("{}", report::topology_summary(&topology)?);
        let tables = match args.scheme() {
            RoutingScheme::Legacy => report::legacy_tables_report(&build_legacy_tables(&topology)?),
            RoutingScheme::Unified => {
                report::unified_tables_report(&build_unified_tables(&topology)?)
            }
        };
        print!("{}", tables);
        return Ok(());
    }

    let timestamp = args.timestamp.unwrap_or_else(orchestrator::current_timestamp);
    let output = orchestrator::compile(&topology, args.scheme(), timestamp)
        .wrap_err_with(|| format!("Failed to compile {}", args.input.display()))?;

    let paths = OutputPaths::new(&args.output, args.hex);
    orchestrator::write_outputs(&output, &paths)?;

    print!("{}", report::output_report(&output, &paths));
    info!("Compilation completed successfully");
    Ok(())
}
