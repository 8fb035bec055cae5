//! Two-pass reconstruction of a [`MetaGraph`] from a [`RawNode`] document.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::{
    collections::{HashMap, HashSet},
    fs,
    path::{Path, PathBuf},
};

use super::RawNode;
use crate::{
    error::MetagraphError,
    metagraph::MetaGraph,
    paths::{absolutize, normalize, string_to_os_path},
    properties::{MetaNode, NodeBody, NodeId, NodeKind},
    registry::TYPES,
};

/// A node after the construction pass: typed, but with its raw (relative) path and with its
/// references still bare ids.
#[derive(Debug, Clone, PartialEq)]
pub struct UnresolvedNode {
    pub id: NodeId,
    pub type_tag: String,
    pub kind: NodeKind,
    pub parent_id: Option<NodeId>,
    /// The directory whose `files` or `directories` listed this node in the document.
    pub container: Option<NodeId>,
    pub metadata: Map<String, Value>,
    pub origin_ids: Vec<NodeId>,
    pub extra: Map<String, Value>,
    pub path: Option<PathBuf>,
    pub files: Vec<NodeId>,
    pub directories: Vec<NodeId>,
    path_resolved: bool,
}

impl UnresolvedNode {
    /// Replace the raw relative path with `normalize(parent_path / path)`.
    ///
    /// Allowed once per node; the root starts out resolved.
    pub fn set_absolute_path(&mut self, parent_path: &Path) -> Result<&Path, MetagraphError> {
        if self.path_resolved {
            return Err(MetagraphError::CorruptGraph(format!(
                "path of node {} was already resolved",
                self.id
            )));
        }
        let path = self.path.as_mut().ok_or_else(|| {
            MetagraphError::CorruptGraph(format!("node {} has no path to resolve", self.id))
        })?;
        *path = normalize(parent_path.join(&*path));
        self.path_resolved = true;
        Ok(path)
    }

    pub fn is_resolved(&self) -> bool {
        self.path_resolved || !self.kind.is_path_node()
    }
}

/// Output of the construction pass of a load.
///
/// Nodes are kept in document pre-order with the root first and the free-standing metadata
/// nodes last. Nothing has been looked up yet.
#[derive(Debug, Clone)]
pub struct UnresolvedGraph {
    nodes: Vec<UnresolvedNode>,
    seen: HashSet<NodeId>,
    metas: Vec<NodeId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn corrupt<S: Into<String>>(msg: S) -> MetagraphError {
    MetagraphError::CorruptGraph(msg.into())
}

impl UnresolvedGraph {
    /// Construction pass: instantiate every node of `doc` from its type tag and check the
    /// document shape.
    pub fn construct(mut doc: RawNode) -> Result<Self, MetagraphError> {
        let now = Utc::now();
        let created_at = doc.created_at.take().unwrap_or_else(|| {
            tracing::warn!("Document root {} has no created_at, using now", doc.id);
            now
        });
        let updated_at = doc.updated_at.take().unwrap_or(created_at);
        let metas = doc.metas.take().unwrap_or_default();

        let mut graph = UnresolvedGraph {
            nodes: Vec::with_capacity(doc.count() + metas.len()),
            seen: HashSet::new(),
            metas: Vec::with_capacity(metas.len()),
            created_at,
            updated_at,
        };
        graph.visit(doc, NodeKind::Root, None)?;
        for meta in metas {
            let id = graph.visit(meta, NodeKind::Meta, None)?;
            graph.metas.push(id);
        }
        tracing::debug!("construct: {} nodes", graph.nodes.len());
        Ok(graph)
    }

    fn visit(
        &mut self,
        mut raw: RawNode,
        expected: NodeKind,
        container: Option<NodeId>,
    ) -> Result<NodeId, MetagraphError> {
        let kind = TYPES.kind_of(&raw.type_tag).ok_or_else(|| {
            corrupt(format!(
                "node {} has unregistered type tag '{}'",
                raw.id, raw.type_tag
            ))
        })?;
        if kind != expected {
            return Err(corrupt(format!(
                "node {} is tagged '{}' ({}) where a {} node is expected",
                raw.id, raw.type_tag, kind, expected
            )));
        }
        if !self.seen.insert(raw.id) {
            return Err(corrupt(format!("node id {} appears twice", raw.id)));
        }

        let path = match (kind.is_path_node(), raw.path.take()) {
            (true, Some(path)) => Some(string_to_os_path(&path)),
            (true, None) => return Err(corrupt(format!("{} node {} has no path", kind, raw.id))),
            (false, Some(_)) => {
                return Err(corrupt(format!("{} node {} carries a path", kind, raw.id)))
            }
            (false, None) => None,
        };
        let has_children = |list: &Option<Vec<RawNode>>| list.as_ref().is_some_and(|l| !l.is_empty());
        if !kind.is_dir() && (has_children(&raw.files) || has_children(&raw.directories)) {
            return Err(corrupt(format!(
                "{} node {} cannot hold files or directories",
                kind, raw.id
            )));
        }
        if kind != NodeKind::Root && has_children(&raw.metas) {
            return Err(corrupt(format!(
                "only the root may hold metadata nodes, found some under {}",
                raw.id
            )));
        }
        for (key, stamp) in [("created_at", raw.created_at), ("updated_at", raw.updated_at)] {
            if let Some(stamp) = stamp {
                raw.extra.insert(key.to_string(), serde_json::to_value(stamp)?);
            }
        }

        let id = raw.id;
        let idx = self.nodes.len();
        self.nodes.push(UnresolvedNode {
            id,
            type_tag: raw.type_tag,
            kind,
            parent_id: raw.parent_id,
            container,
            metadata: raw.metadata,
            origin_ids: raw.origin_ids,
            extra: raw.extra,
            path,
            files: Vec::new(),
            directories: Vec::new(),
            path_resolved: kind == NodeKind::Root,
        });

        let mut files = Vec::new();
        for child in raw.files.unwrap_or_default() {
            files.push(self.visit(child, NodeKind::File, Some(id))?);
        }
        let mut directories = Vec::new();
        for child in raw.directories.unwrap_or_default() {
            directories.push(self.visit(child, NodeKind::Dir, Some(id))?);
        }
        self.nodes[idx].files = files;
        self.nodes[idx].directories = directories;
        Ok(id)
    }

    pub fn root(&self) -> Option<&UnresolvedNode> {
        self.nodes.first()
    }

    pub fn nodes(&self) -> &[UnresolvedNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Point the root at `path` instead of the one recorded in the document.
    pub fn reroot<P: AsRef<Path>>(&mut self, path: P) -> Result<(), MetagraphError> {
        let path = absolutize(path)?;
        let root = self
            .nodes
            .first_mut()
            .ok_or_else(|| corrupt("document has no root"))?;
        tracing::debug!("reroot: {:?} -> {:?}", root.path, path);
        root.path = Some(path);
        Ok(())
    }

    /// Reference-resolution pass: turn `parent_id`s into absolute paths, check that every path
    /// exists on disk and that every origin is part of the document.
    pub fn resolve(self) -> Result<MetaGraph, MetagraphError> {
        let mut nodes = self.nodes;
        let index = nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (node.id, idx))
            .collect::<HashMap<_, _>>();

        for idx in 0..nodes.len() {
            if idx == 0 {
                let root = &nodes[0];
                match root.path.as_deref() {
                    Some(path) if path.is_absolute() => check_exists(root.id, path)?,
                    _ => {
                        return Err(corrupt(format!(
                            "root {} needs an absolute path, found {:?}",
                            root.id, root.path
                        )))
                    }
                }
            } else if let Some(parent_id) = nodes[idx].parent_id {
                let parent_idx = *index.get(&parent_id).ok_or_else(|| {
                    corrupt(format!(
                        "node {} has dangling parent_id {}",
                        nodes[idx].id, parent_id
                    ))
                })?;
                if nodes[idx].kind.is_path_node() {
                    if nodes[idx].container != Some(parent_id) {
                        return Err(corrupt(format!(
                            "node {} names {} as parent but is listed under {:?}",
                            nodes[idx].id, parent_id, nodes[idx].container
                        )));
                    }
                    let parent_path = nodes[parent_idx]
                        .path
                        .clone()
                        .filter(|_| nodes[parent_idx].is_resolved())
                        .ok_or_else(|| {
                            corrupt(format!("parent {parent_id} has no resolved path"))
                        })?;
                    let node = &mut nodes[idx];
                    let id = node.id;
                    let path = node.set_absolute_path(&parent_path)?;
                    check_exists(id, path)?;
                }
            } else if nodes[idx].kind.is_path_node() {
                return Err(corrupt(format!(
                    "{} node {} has no parent_id",
                    nodes[idx].kind, nodes[idx].id
                )));
            }

            if let Some(origin) = nodes[idx]
                .origin_ids
                .iter()
                .find(|origin| !index.contains_key(*origin))
            {
                return Err(corrupt(format!(
                    "node {} has dangling origin {}",
                    nodes[idx].id, origin
                )));
            }
        }

        let nodes = nodes
            .into_iter()
            .map(|node| {
                let body = match (node.kind, node.path) {
                    (NodeKind::Meta, _) => NodeBody::Meta,
                    (NodeKind::File, Some(path)) => NodeBody::File { path },
                    (NodeKind::Dir | NodeKind::Root, Some(path)) => NodeBody::Dir {
                        path,
                        files: node.files,
                        directories: node.directories,
                    },
                    (kind, None) => {
                        return Err(corrupt(format!("{} node {} has no path", kind, node.id)))
                    }
                };
                Ok(MetaNode::from_parts(
                    node.id,
                    node.type_tag,
                    node.parent_id,
                    node.metadata,
                    node.origin_ids,
                    node.extra,
                    body,
                ))
            })
            .collect::<Result<Vec<_>, MetagraphError>>()?;

        Ok(MetaGraph::from_parts(
            nodes,
            self.metas,
            self.created_at,
            self.updated_at,
            None,
        ))
    }
}

fn check_exists(id: NodeId, path: &Path) -> Result<(), MetagraphError> {
    if path.exists() {
        Ok(())
    } else {
        Err(corrupt(format!(
            "path {path:?} of node {id} does not exist on disk"
        )))
    }
}

fn read_document(path: &Path) -> Result<RawNode, MetagraphError> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|e| corrupt(format!("{path:?} is not a graph document: {e}")))
}

impl MetaGraph {
    /// Load a graph saved with [`MetaGraph::save`]. Every path in the document must exist.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, MetagraphError> {
        let path = absolutize(path)?;
        let unresolved = UnresolvedGraph::construct(read_document(&path)?)?;
        MetaGraph::finish_load(unresolved, path)
    }

    /// Load a graph whose tree has moved: the document's root path is replaced by `root`.
    pub fn load_with_root<P: AsRef<Path>, R: AsRef<Path>>(
        path: P,
        root: R,
    ) -> Result<Self, MetagraphError> {
        let path = absolutize(path)?;
        let mut unresolved = UnresolvedGraph::construct(read_document(&path)?)?;
        unresolved.reroot(root)?;
        MetaGraph::finish_load(unresolved, path)
    }

    /// Build a graph from an in-memory document.
    pub fn from_document(doc: RawNode) -> Result<Self, MetagraphError> {
        UnresolvedGraph::construct(doc)?.resolve()
    }

    fn finish_load(unresolved: UnresolvedGraph, path: PathBuf) -> Result<Self, MetagraphError> {
        let mut graph = unresolved.resolve()?;
        tracing::info!("Loaded {} nodes from {:?}", graph.node_count(), path);
        graph.save_location = Some(path);
        Ok(graph)
    }
}
