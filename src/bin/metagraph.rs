//! metagraph CLI tool
//!
//! Command-line interface for building and inspecting metadata graphs with metagraph-core.
//!
//! ## Commands
//!
//! - `scan <dir>`: Mirror a directory into a new graph and save it
//! - `show <file>`: Load a saved graph and print its tree
//! - `sources <file> <id>`: List the provenance ancestors of a node
//! - `check <file>`: Load a saved graph and report provenance cycles

use clap::{Parser, Subcommand};
use metagraph_core::{
    codec::SaveOptions, config::GraphConfig, metagraph::SourceDepth, MetaGraph, NodeId,
};
use std::{path::PathBuf, process::ExitCode};

#[derive(Parser)]
#[command(name = "metagraph")]
#[command(author, version, about = "A tool for recording metadata about the files in a directory", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a graph mirroring a directory and save it
    Scan {
        /// Directory to mirror
        dir: PathBuf,

        /// Where to write the graph (defaults to the metadata file inside the directory)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Replace an existing graph file
        #[arg(long)]
        overwrite: bool,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Load a graph and print its tree
    Show {
        /// Graph file to load
        file: PathBuf,
    },

    /// List the provenance ancestors of a node
    Sources {
        /// Graph file to load
        file: PathBuf,

        /// Node id
        id: NodeId,

        /// shallow, all or deepest
        #[arg(short, long, default_value = "shallow")]
        depth: SourceDepth,
    },

    /// Load a graph and report provenance cycles
    Check {
        /// Graph file to load
        file: PathBuf,
    },
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            dir,
            out,
            overwrite,
            config,
        } => {
            let config = match config {
                Some(path) => GraphConfig::from_file(path)?,
                None => GraphConfig::default(),
            };
            let mut graph = MetaGraph::create_from_directory_with(&dir, config)?;
            let dest = graph.save(SaveOptions {
                dest: out,
                overwrite,
                indent: None,
            })?;
            println!("Wrote {} nodes to {}", graph.node_count(), dest.display());
        }

        Commands::Show { file } => {
            let graph = MetaGraph::load(&file)?;
            graph.pprint();
        }

        Commands::Sources { file, id, depth } => {
            let graph = MetaGraph::load(&file)?;
            for source in graph.get_sources(id, depth)? {
                println!("{}\t{}", source.id(), source);
            }
        }

        Commands::Check { file } => {
            let graph = MetaGraph::load(&file)?;
            let cycles = graph.find_provenance_cycles();
            if cycles.is_empty() {
                println!("{}: {} nodes, no provenance cycles", file.display(), graph.node_count());
                return Ok(ExitCode::SUCCESS);
            }
            for cycle in cycles {
                let ids = cycle
                    .iter()
                    .map(|id| id.to_string())
                    .collect::<Vec<_>>()
                    .join(" -> ");
                println!("cycle: {ids}");
            }
            return Ok(ExitCode::FAILURE);
        }
    }

    Ok(ExitCode::SUCCESS)
}
