/// [crate::properties] contains the basic building blocks of a [crate::metagraph::MetaGraph]:
/// node identifiers, node kinds and the [MetaNode] record itself.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{
    fmt::{Display, Formatter},
    path::{Path, PathBuf},
    str::FromStr,
};

pub use uuid::Uuid;

use crate::error::MetagraphError;

/// Type tag of a free-standing, path-less metadata node.
pub const META_NODE_TAG: &str = "MetaNode";
/// Type tag of a file node.
pub const FILE_NODE_TAG: &str = "FileNode";
/// Type tag of a directory node.
pub const DIR_NODE_TAG: &str = "DirNode";
/// Type tag of the graph root.
pub const ROOT_META_TAG: &str = "RootMeta";

/// Node identifier. A random (v4) UUID, serialized as its hyphenated lowercase string.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[serde(transparent)]
pub struct NodeId(Uuid);

impl NodeId {
    pub fn new() -> Self {
        NodeId(Uuid::new_v4())
    }

    pub fn nil() -> Self {
        NodeId(Uuid::nil())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        NodeId::new()
    }
}

impl AsRef<Uuid> for NodeId {
    fn as_ref(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for NodeId {
    fn from(id: Uuid) -> Self {
        NodeId(id)
    }
}

impl TryFrom<&str> for NodeId {
    type Error = MetagraphError;

    fn try_from(string: &str) -> Result<Self, Self::Error> {
        Ok(NodeId(Uuid::parse_str(string)?))
    }
}

impl FromStr for NodeId {
    type Err = MetagraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeId::try_from(s)
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            self.0.hyphenated().encode_lower(&mut Uuid::encode_buffer())
        )
    }
}

impl From<NodeId> for String {
    fn from(val: NodeId) -> Self {
        format!("{val}")
    }
}

/// The structural shape a type tag maps onto.
///
/// Every registered type tag resolves to exactly one kind; the kind decides which fields a node
/// carries and where it may sit in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeKind {
    Meta,
    File,
    Dir,
    Root,
}

impl NodeKind {
    pub fn is_path_node(&self) -> bool {
        !matches!(self, NodeKind::Meta)
    }

    pub fn is_file(&self) -> bool {
        matches!(self, NodeKind::File)
    }

    /// The root is a directory too.
    pub fn is_dir(&self) -> bool {
        matches!(self, NodeKind::Dir | NodeKind::Root)
    }

    pub fn default_tag(&self) -> &'static str {
        match self {
            NodeKind::Meta => META_NODE_TAG,
            NodeKind::File => FILE_NODE_TAG,
            NodeKind::Dir => DIR_NODE_TAG,
            NodeKind::Root => ROOT_META_TAG,
        }
    }
}

impl Display for NodeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Kind-specific payload of a [MetaNode].
#[derive(Debug, Clone, PartialEq)]
pub enum NodeBody {
    Meta,
    File {
        path: PathBuf,
    },
    Dir {
        path: PathBuf,
        files: Vec<NodeId>,
        directories: Vec<NodeId>,
    },
}

impl NodeBody {
    pub(crate) fn dir(path: PathBuf) -> Self {
        NodeBody::Dir {
            path,
            files: Vec::new(),
            directories: Vec::new(),
        }
    }
}

/// A node of the metadata graph.
///
/// Path-bearing nodes (files, directories and the root) hold an absolute path once they belong
/// to a [crate::metagraph::MetaGraph]. `parent_id` and `origin_ids` are plain ids; the graph
/// resolves them on demand and never treats them as ownership.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaNode {
    pub(crate) id: NodeId,
    pub(crate) type_tag: String,
    pub(crate) parent_id: Option<NodeId>,
    pub metadata: Map<String, Value>,
    pub(crate) origin_ids: Vec<NodeId>,
    pub(crate) extra: Map<String, Value>,
    pub(crate) body: NodeBody,
}

impl MetaNode {
    fn with_body(tag: &str, body: NodeBody) -> Self {
        MetaNode {
            id: NodeId::new(),
            type_tag: tag.to_string(),
            parent_id: None,
            metadata: Map::new(),
            origin_ids: Vec::new(),
            extra: Map::new(),
            body,
        }
    }

    /// A free-standing metadata node with no path.
    pub fn meta() -> Self {
        MetaNode::with_body(META_NODE_TAG, NodeBody::Meta)
    }

    /// A file node. `path` may be absolute or relative to the directory it will be attached to.
    pub fn file<P: Into<PathBuf>>(path: P) -> Self {
        MetaNode::with_body(FILE_NODE_TAG, NodeBody::File { path: path.into() })
    }

    /// A directory node. `path` may be absolute or relative to the directory it will be attached
    /// to.
    pub fn dir<P: Into<PathBuf>>(path: P) -> Self {
        MetaNode::with_body(DIR_NODE_TAG, NodeBody::dir(path.into()))
    }

    pub(crate) fn root(path: PathBuf) -> Self {
        MetaNode::with_body(ROOT_META_TAG, NodeBody::dir(path))
    }

    pub(crate) fn from_parts(
        id: NodeId,
        type_tag: String,
        parent_id: Option<NodeId>,
        metadata: Map<String, Value>,
        origin_ids: Vec<NodeId>,
        extra: Map<String, Value>,
        body: NodeBody,
    ) -> Self {
        MetaNode {
            id,
            type_tag,
            parent_id,
            metadata,
            origin_ids,
            extra,
            body,
        }
    }

    /// Use a registered variant tag instead of the built-in one. The tag is checked against the
    /// type registry when the node is attached to a graph.
    pub fn with_type_tag<S: Into<String>>(mut self, tag: S) -> Self {
        self.type_tag = tag.into();
        self
    }

    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_id(mut self, id: NodeId) -> Self {
        self.id = id;
        self
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    pub fn parent_id(&self) -> Option<NodeId> {
        self.parent_id
    }

    pub fn origin_ids(&self) -> &[NodeId] {
        &self.origin_ids
    }

    /// Unrecognized document fields carried through load and save untouched.
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    pub fn body(&self) -> &NodeBody {
        &self.body
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.body {
            NodeBody::Meta => None,
            NodeBody::File { path } | NodeBody::Dir { path, .. } => Some(path),
        }
    }

    pub(crate) fn path_mut(&mut self) -> Option<&mut PathBuf> {
        match &mut self.body {
            NodeBody::Meta => None,
            NodeBody::File { path } | NodeBody::Dir { path, .. } => Some(path),
        }
    }

    /// Final component of the path, if this is a path node.
    pub fn name(&self) -> Option<&str> {
        self.path()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
    }

    pub fn is_file(&self) -> bool {
        matches!(self.body, NodeBody::File { .. })
    }

    pub fn is_dir(&self) -> bool {
        matches!(self.body, NodeBody::Dir { .. })
    }

    pub fn is_path_node(&self) -> bool {
        !matches!(self.body, NodeBody::Meta)
    }

    /// Direct file children, empty for non-directories.
    pub fn files(&self) -> &[NodeId] {
        match &self.body {
            NodeBody::Dir { files, .. } => files,
            _ => &[],
        }
    }

    /// Direct directory children, empty for non-directories.
    pub fn directories(&self) -> &[NodeId] {
        match &self.body {
            NodeBody::Dir { directories, .. } => directories,
            _ => &[],
        }
    }

    /// Structural kind implied by the body. A root node reports [NodeKind::Dir] here; the graph
    /// knows which directory is its root.
    pub fn body_kind(&self) -> NodeKind {
        match self.body {
            NodeBody::Meta => NodeKind::Meta,
            NodeBody::File { .. } => NodeKind::File,
            NodeBody::Dir { .. } => NodeKind::Dir,
        }
    }
}

impl Display for MetaNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{}({})", self.type_tag, name),
            None => match self.path() {
                Some(path) => write!(f, "{}({})", self.type_tag, path.display()),
                None => write!(f, "{}({})", self.type_tag, self.id),
            },
        }
    }
}
