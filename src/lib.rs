//! # metagraph-core
//!
//! A Rust library for recording metadata about the files a pipeline produces, as a graph that
//! mirrors a directory on disk.
//!
//! ## Overview
//!
//! A [`MetaGraph`] owns a tree of path-bearing nodes (files and directories) rooted at one
//! directory, a list of free-standing metadata nodes (runs, sessions, anything without a path)
//! and "derived from" edges between any two of them. The whole graph persists to a single JSON
//! document (canonically `metadata.json` inside the root directory) and can be loaded back with
//! every id, path, edge and metadata field intact.
//!
//! ### Key Features
//!
//! - **Directory mirroring**: [`MetaGraph::create_from_directory`] walks a directory into nodes
//! - **Free-form metadata**: every node carries a JSON object of caller-defined fields
//! - **Provenance**: [`MetaGraph::add_origin`] records derivations, [`MetaGraph::get_sources`]
//!   walks them at three depths
//! - **Typed variants**: node variants are identified by a type tag registered in
//!   [`registry::TYPES`], so downstream crates can add their own
//! - **Safe persistence**: saves are atomic and never clobber a file unless asked to; loads are
//!   all-or-nothing
//!
//! ## Architecture
//!
//! - **[`metagraph`]**: The graph itself, tree lookups and provenance traversal
//! - **[`properties`]**: Node identifiers (`NodeId`), node kinds and the `MetaNode` record
//! - **[`codec`]**: The JSON document model, atomic save and the two-pass load
//! - **[`registry`]**: Process-wide type tag registry
//! - **[`paths`]**: Lexical path normalization and document path encoding
//! - **[`config`]**: TOML-backed [`config::GraphConfig`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use metagraph_core::{codec::SaveOptions, metagraph::SourceDepth, MetaGraph};
//! use serde_json::{json, Map};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut graph = MetaGraph::create_from_directory("./site")?;
//!
//!     // Record a fetched page and the text extracted from it
//!     let mut meta = Map::new();
//!     meta.insert("source_url".into(), json!("https://example.com/"));
//!     let page = graph.register_file("raw", "index.html", meta)?;
//!     let text = graph.register_file("text", "index.txt", Map::new())?;
//!     graph.add_origin(text, page)?;
//!
//!     for source in graph.get_sources(text, SourceDepth::All)? {
//!         println!("{} <- {}", graph.node(text)?, source);
//!     }
//!
//!     graph.save(SaveOptions::default().overwrite(true))?;
//!     let reloaded = MetaGraph::load("./site/metadata.json")?;
//!     assert_eq!(reloaded.node_count(), graph.node_count());
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **default**: The library
//! - **bin**: The `metagraph` command line tool (`clap`, `tracing-subscriber`)

pub mod codec;
pub mod config;
pub mod error;
pub mod metagraph;
pub mod paths;
pub mod properties;
pub mod registry;
#[cfg(test)]
mod tests;

pub use error::*;
pub use metagraph::MetaGraph;
pub use properties::{MetaNode, NodeId, NodeKind};
