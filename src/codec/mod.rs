//! Persistence of a [`MetaGraph`] as one JSON document.
//!
//! ## Key Components
//!
//! - [`RawNode`] - Serde model of the document, one record per node with subtrees nested inline
//! - [`SaveOptions`] - Destination, overwrite and indentation for [`MetaGraph::save`]
//! - [`UnresolvedGraph`] - Output of the construction pass of a load, before references resolve
//!
//! ## Loading
//!
//! [`MetaGraph::load`] runs two passes over a parsed document:
//!
//! 1. **Construction**: every node is instantiated from its `type_tag` via the type registry
//!    ([`crate::registry::TYPES`]), keeping paths relative and references as bare ids.
//! 2. **Resolution**: an id map over the whole tree plus the free-standing metadata nodes turns
//!    `parent_id`s into absolute paths (checked against the filesystem) and validates every
//!    `origin_ids` entry.
//!
//! Any failure aborts the load; no partially resolved graph is ever returned.
//!
//! ## Saving
//!
//! The document is written to a temporary file in the destination directory and renamed over
//! the destination, so readers observe either the previous document or the complete new one.

pub mod document;
pub mod resolve;

pub use document::RawNode;
pub use resolve::{UnresolvedGraph, UnresolvedNode};

use chrono::Utc;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::{
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;

use crate::{
    error::MetagraphError,
    metagraph::MetaGraph,
    paths::{absolutize, os_path_to_string},
    properties::{NodeBody, NodeId},
};

/// Options for [`MetaGraph::save`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveOptions {
    /// Destination file. Defaults to the remembered location, then to the configured metadata
    /// file inside the root directory.
    pub dest: Option<PathBuf>,
    /// Replace an existing destination file.
    pub overwrite: bool,
    /// JSON indentation width. Defaults to the graph config.
    pub indent: Option<usize>,
}

impl SaveOptions {
    pub fn to<P: Into<PathBuf>>(dest: P) -> Self {
        SaveOptions {
            dest: Some(dest.into()),
            ..Default::default()
        }
    }

    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn indent(mut self, indent: usize) -> Self {
        self.indent = Some(indent);
        self
    }
}

impl MetaGraph {
    /// Build the document for this graph.
    pub fn to_document(&self) -> Result<RawNode, MetagraphError> {
        let mut doc = self.raw_node(0)?;
        doc.metas = Some(
            self.metas
                .iter()
                .map(|id| self.idx(*id).and_then(|idx| self.raw_node(idx)))
                .collect::<Result<Vec<_>, _>>()?,
        );
        doc.created_at = Some(self.created_at);
        doc.updated_at = Some(self.updated_at);
        Ok(doc)
    }

    fn raw_node(&self, idx: usize) -> Result<RawNode, MetagraphError> {
        let node = &self.nodes[idx];
        let parent_is_path_node = node
            .parent_id
            .and_then(|parent_id| self.get_node(parent_id))
            .map(|parent| parent.is_path_node())
            .unwrap_or(false);
        let path = match node.path() {
            Some(_) if parent_is_path_node => {
                Some(os_path_to_string(self.relative_to(node.id, None)?))
            }
            Some(path) => Some(os_path_to_string(path)),
            None => None,
        };
        let (files, directories) = match &node.body {
            NodeBody::Dir {
                files, directories, ..
            } => (
                Some(self.raw_children(files)?),
                Some(self.raw_children(directories)?),
            ),
            _ => (None, None),
        };
        Ok(RawNode {
            id: node.id,
            type_tag: node.type_tag.clone(),
            parent_id: node.parent_id,
            metadata: node.metadata.clone(),
            origin_ids: node.origin_ids.clone(),
            path,
            files,
            directories,
            metas: None,
            created_at: None,
            updated_at: None,
            extra: node.extra.clone(),
        })
    }

    fn raw_children(&self, ids: &[NodeId]) -> Result<Vec<RawNode>, MetagraphError> {
        ids.iter()
            .map(|id| self.idx(*id).and_then(|idx| self.raw_node(idx)))
            .collect()
    }

    /// Serialize the document with `indent` spaces per level.
    pub fn to_json_string(&self, indent: usize) -> Result<String, MetagraphError> {
        let doc = self.to_document()?;
        let indent = vec![b' '; indent];
        let mut buf = Vec::new();
        let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(&indent));
        doc.serialize(&mut ser)?;
        String::from_utf8(buf)
            .map_err(|e| MetagraphError::Serialization(format!("document is not UTF-8: {e}")))
    }

    /// Write the graph to disk atomically and return the destination.
    ///
    /// Fails with [`MetagraphError::Conflict`] if the destination exists and
    /// `options.overwrite` is false; the existing file is left untouched.
    pub fn save(&mut self, options: SaveOptions) -> Result<PathBuf, MetagraphError> {
        let dest = match options.dest.or_else(|| self.save_location.clone()) {
            Some(dest) => absolutize(dest)?,
            None => self.root_path().join(&self.config.metadata_file),
        };
        if !options.overwrite && dest.exists() {
            return Err(MetagraphError::Conflict(format!("{dest:?}")));
        }
        let indent = options.indent.unwrap_or(self.config.indent);

        let previous = self.updated_at;
        self.updated_at = Utc::now();
        let written = self
            .to_json_string(indent)
            .and_then(|content| write_atomic(&dest, content.as_bytes(), options.overwrite));
        if let Err(e) = written {
            self.updated_at = previous;
            return Err(e);
        }

        tracing::info!("Saved {} nodes to {:?}", self.node_count(), dest);
        self.save_location = Some(dest.clone());
        Ok(dest)
    }
}

/// Write `bytes` to a temporary file next to `path`, then rename it over `path`.
fn write_atomic(path: &Path, bytes: &[u8], overwrite: bool) -> Result<(), MetagraphError> {
    let parent = path
        .parent()
        .ok_or_else(|| MetagraphError::InvalidPath(format!("{path:?} has no parent directory")))?;
    fs::create_dir_all(parent)?;
    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.as_file().sync_all()?;
    let persisted = if overwrite {
        tmp.persist(path)
    } else {
        tmp.persist_noclobber(path)
    };
    match persisted {
        Ok(_) => Ok(()),
        Err(e) if e.error.kind() == ErrorKind::AlreadyExists => {
            Err(MetagraphError::Conflict(format!("{path:?}")))
        }
        Err(e) => Err(e.into()),
    }
}
