//! MetaGraph module: the in-memory metadata object graph.
//!
//! A [`MetaGraph`] is the root of a tree of path-bearing nodes (files and directories) that
//! mirrors a directory on disk, plus a list of free-standing metadata nodes and the provenance
//! edges between any of them.
//!
//! # Module Organization
//!
//! - [`tree`]: Directory views, lookups and pre-order traversal ([`DirView`], [`Lookup`], [`TreeIter`])
//! - [`provenance`]: "Derived from" edges and their traversal ([`SourceDepth`], [`Sources`])
//!
//! Nodes live in one arena owned by the graph. Children are listed by id inside their
//! directory; `parent_id` and `origin_ids` are resolved through the arena index whenever they
//! are followed, so no node ever holds a pointer to another.

mod provenance;
mod tree;

pub use provenance::{Derived, ProvenanceGraph, SourceDepth, Sources};
pub use tree::{DirView, Lookup, TreeIter};

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};
use walkdir::{DirEntry, WalkDir};

use crate::{
    config::GraphConfig,
    error::MetagraphError,
    paths::{absolutize, normalize, relative_path},
    properties::{MetaNode, NodeBody, NodeId, NodeKind},
    registry::TYPES,
};

/// The graph root (`RootMeta`): a root directory node, its subtree, free-standing metadata
/// nodes, timestamps and the location the graph was last saved to or loaded from.
#[derive(Debug, Clone)]
pub struct MetaGraph {
    pub(crate) nodes: Vec<MetaNode>,
    pub(crate) index: HashMap<NodeId, usize>,
    pub(crate) root: NodeId,
    pub(crate) metas: Vec<NodeId>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
    pub(crate) save_location: Option<PathBuf>,
    pub(crate) config: GraphConfig,
}

impl MetaGraph {
    /// Create an empty graph rooted at `root_path`. Relative paths are taken against the current
    /// working directory. The directory does not need to exist yet.
    pub fn new<P: AsRef<Path>>(root_path: P) -> Result<Self, MetagraphError> {
        let root = MetaNode::root(absolutize(root_path)?);
        let now = Utc::now();
        Ok(MetaGraph::from_parts(
            vec![root],
            Vec::new(),
            now,
            now,
            None,
        ))
    }

    /// Assemble a graph from an already consistent arena. The root must be the first node.
    pub(crate) fn from_parts(
        nodes: Vec<MetaNode>,
        metas: Vec<NodeId>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        save_location: Option<PathBuf>,
    ) -> Self {
        let index = nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (node.id, idx))
            .collect::<HashMap<_, _>>();
        let root = nodes.first().map(|n| n.id).unwrap_or_else(NodeId::nil);
        MetaGraph {
            nodes,
            index,
            root,
            metas,
            created_at,
            updated_at,
            save_location,
            config: GraphConfig::default(),
        }
    }

    pub fn with_config(mut self, config: GraphConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Build a graph mirroring the existing directory at `path`.
    pub fn create_from_directory<P: AsRef<Path>>(path: P) -> Result<Self, MetagraphError> {
        MetaGraph::create_from_directory_with(path, GraphConfig::default())
    }

    pub fn create_from_directory_with<P: AsRef<Path>>(
        path: P,
        config: GraphConfig,
    ) -> Result<Self, MetagraphError> {
        let path = path.as_ref();
        if !path.is_dir() {
            return Err(MetagraphError::NotFound(format!(
                "{path:?} is not an existing directory"
            )));
        }
        let mut graph = MetaGraph::new(path)?.with_config(config);
        let root = graph.root;
        let count = graph.populate_from_directory(root)?;
        tracing::info!(
            "Created graph for {:?} with {} filesystem nodes",
            graph.root_path(),
            count
        );
        Ok(graph)
    }

    pub fn root_id(&self) -> NodeId {
        self.root
    }

    pub fn root_node(&self) -> &MetaNode {
        &self.nodes[0]
    }

    pub fn root_path(&self) -> &Path {
        self.root_node().path().unwrap_or_else(|| Path::new("/"))
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Where the graph was last saved to or loaded from.
    pub fn save_location(&self) -> Option<&Path> {
        self.save_location.as_deref()
    }

    /// Number of nodes including the root and the free-standing metadata nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    pub(crate) fn idx(&self, id: NodeId) -> Result<usize, MetagraphError> {
        self.index
            .get(&id)
            .copied()
            .ok_or_else(|| MetagraphError::NotFound(format!("node {id} is not in the graph")))
    }

    pub(crate) fn get_node(&self, id: NodeId) -> Option<&MetaNode> {
        self.index.get(&id).map(|idx| &self.nodes[*idx])
    }

    pub fn node(&self, id: NodeId) -> Result<&MetaNode, MetagraphError> {
        Ok(&self.nodes[self.idx(id)?])
    }

    /// Mutable access to a node's free-form metadata.
    pub fn metadata_mut(&mut self, id: NodeId) -> Result<&mut Map<String, Value>, MetagraphError> {
        let idx = self.idx(id)?;
        Ok(&mut self.nodes[idx].metadata)
    }

    /// Every node in insertion order, the root first.
    pub fn nodes(&self) -> impl Iterator<Item = &MetaNode> {
        self.nodes.iter()
    }

    /// Free-standing metadata nodes, in insertion order.
    pub fn metas(&self) -> impl Iterator<Item = &MetaNode> {
        self.metas.iter().filter_map(|id| self.get_node(*id))
    }

    pub fn parent(&self, id: NodeId) -> Result<Option<&MetaNode>, MetagraphError> {
        match self.node(id)?.parent_id {
            Some(parent_id) => self.node(parent_id).map(Some),
            None => Ok(None),
        }
    }

    /// Attach a file node to the directory `dir`. A relative path is resolved against the
    /// directory's path; a path that ends up outside the directory is an
    /// [`MetagraphError::InvalidPath`]. Sibling names are not checked for uniqueness.
    pub fn add_file(&mut self, dir: NodeId, file: MetaNode) -> Result<NodeId, MetagraphError> {
        self.attach(dir, file, NodeKind::File)
    }

    /// Attach a directory node to the directory `dir`. A relative path is resolved against the
    /// directory's path; a path that ends up outside the directory is an
    /// [`MetagraphError::InvalidPath`]. Sibling names are not checked for uniqueness.
    pub fn add_dir(&mut self, dir: NodeId, subdir: MetaNode) -> Result<NodeId, MetagraphError> {
        self.attach(dir, subdir, NodeKind::Dir)
    }

    /// Append a path-less node to the root's free-standing metadata list.
    pub fn add_meta(&mut self, meta: MetaNode) -> Result<NodeId, MetagraphError> {
        self.check_insertable(&meta, NodeKind::Meta)?;
        if let Some(parent_id) = meta.parent_id {
            self.idx(parent_id)?;
        }
        let id = meta.id;
        tracing::debug!("add_meta: {}", meta);
        self.index.insert(id, self.nodes.len());
        self.nodes.push(meta);
        self.metas.push(id);
        Ok(id)
    }

    fn check_insertable(&self, node: &MetaNode, expected: NodeKind) -> Result<(), MetagraphError> {
        if self.contains(node.id) {
            return Err(MetagraphError::Conflict(format!(
                "node {} is already part of the graph",
                node.id
            )));
        }
        match TYPES.kind_of(&node.type_tag) {
            None => Err(MetagraphError::TypeRegistry(format!(
                "type tag '{}' is not registered",
                node.type_tag
            ))),
            Some(kind) if kind != expected || node.body_kind() != expected => {
                Err(MetagraphError::TypeRegistry(format!(
                    "type tag '{}' is a {} node, expected {}",
                    node.type_tag, kind, expected
                )))
            }
            Some(_) => Ok(()),
        }
    }

    fn attach(
        &mut self,
        dir: NodeId,
        mut node: MetaNode,
        expected: NodeKind,
    ) -> Result<NodeId, MetagraphError> {
        self.check_insertable(&node, expected)?;
        let dir_idx = self.idx(dir)?;
        let dir_path = match &self.nodes[dir_idx].body {
            NodeBody::Dir { path, .. } => path.clone(),
            _ => {
                return Err(MetagraphError::InvalidPath(format!(
                    "{} is not a directory node",
                    self.nodes[dir_idx]
                )))
            }
        };
        if let Some(path) = node.path_mut() {
            *path = normalize(dir_path.join(&*path));
            relative_path(&*path, &dir_path)?;
        }
        node.parent_id = Some(dir);
        let id = node.id;
        tracing::debug!("attach: {} under {:?}", node, dir_path);
        self.index.insert(id, self.nodes.len());
        self.nodes.push(node);
        if let NodeBody::Dir {
            files, directories, ..
        } = &mut self.nodes[dir_idx].body
        {
            match expected {
                NodeKind::File => files.push(id),
                _ => directories.push(id),
            }
        }
        Ok(id)
    }

    /// Path of `id` relative to `other`, or to its own parent when `other` is `None`.
    pub fn relative_to(
        &self,
        id: NodeId,
        other: Option<NodeId>,
    ) -> Result<PathBuf, MetagraphError> {
        let node = self.node(id)?;
        let other = match other {
            Some(other) => self.node(other)?,
            None => match node.parent_id {
                Some(parent_id) => self.node(parent_id)?,
                None => return Err(MetagraphError::UnparentedNode(format!("{node}"))),
            },
        };
        match (node.path(), other.path()) {
            (Some(path), Some(base)) => relative_path(path, base),
            _ => Err(MetagraphError::InvalidPath(format!(
                "cannot compute a path between {node} and {other}"
            ))),
        }
    }

    /// Mirror the filesystem children of directory node `dir`, recursively. Returns the number
    /// of nodes created.
    ///
    /// Entries are attached in filesystem iteration order, which differs between platforms,
    /// unless the graph config asks for sorted entries.
    pub fn populate_from_directory(&mut self, dir: NodeId) -> Result<usize, MetagraphError> {
        fn is_hidden(entry: &DirEntry) -> bool {
            entry
                .file_name()
                .to_str()
                .map(|s| s.starts_with('.'))
                .unwrap_or(false)
        }

        let dir_path = match self.node(dir)?.body() {
            NodeBody::Dir { path, .. } => path.clone(),
            _ => {
                return Err(MetagraphError::InvalidPath(format!(
                    "{} is not a directory node",
                    self.node(dir)?
                )))
            }
        };
        let skip_hidden = self.config.skip_hidden;
        let mut walker = WalkDir::new(&dir_path)
            .min_depth(1)
            .follow_links(self.config.follow_links);
        if self.config.sort_entries {
            walker = walker.sort_by_file_name();
        }

        let mut parents = HashMap::from([(dir_path.clone(), dir)]);
        let mut count = 0;
        for entry in walker
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !skip_hidden || !is_hidden(e))
        {
            let entry = entry?;
            let path = entry.path();
            let parent_id = match path.parent().and_then(|p| parents.get(p)) {
                Some(id) => *id,
                None => {
                    tracing::warn!("populate_from_directory: no parent node for {:?}", path);
                    continue;
                }
            };
            // a symlinked directory is a directory; walkdir only descends into it when
            // following links
            if entry.file_type().is_dir() || entry.path().is_dir() {
                let id = self.add_dir(parent_id, MetaNode::dir(path))?;
                parents.insert(path.to_path_buf(), id);
            } else {
                self.add_file(parent_id, MetaNode::file(path))?;
            }
            count += 1;
        }
        tracing::debug!(
            "populate_from_directory: {} nodes under {:?}",
            count,
            dir_path
        );
        Ok(count)
    }

    /// The create form of a directory lookup: synthesize `dir/name`, attach it under `dir` and
    /// return it.
    ///
    /// Nothing is deduplicated. Two calls with the same name attach two distinct same-named
    /// siblings, and later lookups return the first. Look up with [`DirView::get_dir`] first to
    /// reuse an existing directory.
    pub fn get_or_create_dir(&mut self, dir: NodeId, name: &str) -> Result<NodeId, MetagraphError> {
        let path = self.dir(dir)?.path().join(name);
        tracing::debug!("get_or_create_dir: creating {:?}", path);
        self.add_dir(dir, MetaNode::dir(path))
    }

    /// The create form of a file lookup. Like [`MetaGraph::get_or_create_dir`], every call
    /// attaches a new node.
    pub fn get_or_create_file(
        &mut self,
        dir: NodeId,
        name: &str,
    ) -> Result<NodeId, MetagraphError> {
        let path = self.dir(dir)?.path().join(name);
        tracing::debug!("get_or_create_file: creating {:?}", path);
        self.add_file(dir, MetaNode::file(path))
    }

    /// Register an artifact produced by a pipeline stage: the file is attached to the root-level
    /// group directory `group` (created on first use) and carries `metadata`. A relative `path`
    /// is taken relative to the group directory.
    pub fn register_file<P: AsRef<Path>>(
        &mut self,
        group: &str,
        path: P,
        metadata: Map<String, Value>,
    ) -> Result<NodeId, MetagraphError> {
        let existing = self
            .root()
            .find(group, &Lookup::dirs().shallow())
            .map(|node| node.id());
        let group_id = match existing {
            Some(id) => id,
            None => self.get_or_create_dir(self.root, group)?,
        };
        let file = MetaNode::file(path.as_ref()).with_metadata(metadata);
        self.add_file(group_id, file)
    }

    /// `(path, metadata)` for every file of `group`, or of the whole tree when `group` is `None`.
    pub fn get_files_meta(
        &self,
        group: Option<&str>,
        recursive: bool,
    ) -> Result<impl Iterator<Item = (&Path, &Map<String, Value>)>, MetagraphError> {
        let dir = match group {
            Some(group) => self.root().get_dir(group)?,
            None => self.root(),
        };
        Ok(dir
            .get_files(recursive)
            .filter_map(|file| file.path().map(|path| (path, &file.metadata))))
    }
}
