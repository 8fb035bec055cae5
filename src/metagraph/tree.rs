//! Read-only views over the directory tree of a [`MetaGraph`].

use std::{collections::VecDeque, path::Path};

use super::MetaGraph;
use crate::{
    error::MetagraphError,
    paths::os_path_to_string,
    properties::{MetaNode, NodeId},
};

/// Filter for [`DirView::get`] and [`DirView::find`].
///
/// The default matches both files and directories, searching recursively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lookup {
    pub recursive: bool,
    pub is_file: bool,
    pub is_dir: bool,
}

impl Default for Lookup {
    fn default() -> Self {
        Lookup {
            recursive: true,
            is_file: true,
            is_dir: true,
        }
    }
}

impl Lookup {
    pub fn files() -> Self {
        Lookup {
            is_dir: false,
            ..Default::default()
        }
    }

    pub fn dirs() -> Self {
        Lookup {
            is_file: false,
            ..Default::default()
        }
    }

    /// Only search the direct children.
    pub fn shallow(mut self) -> Self {
        self.recursive = false;
        self
    }

    fn accepts(&self, node: &MetaNode) -> bool {
        (self.is_file && node.is_file()) || (self.is_dir && node.is_dir())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Select {
    Files,
    Dirs,
    All,
}

/// Lazy pre-order walk over a directory subtree.
///
/// Each directory's direct children are yielded first (files before directories when both are
/// selected), then each subdirectory is descended into in child order.
#[derive(Debug, Clone)]
pub struct TreeIter<'a> {
    graph: &'a MetaGraph,
    select: Select,
    recursive: bool,
    pending: VecDeque<NodeId>,
    stack: Vec<NodeId>,
}

impl<'a> TreeIter<'a> {
    fn new(graph: &'a MetaGraph, start: NodeId, select: Select, recursive: bool) -> Self {
        TreeIter {
            graph,
            select,
            recursive,
            pending: VecDeque::new(),
            stack: vec![start],
        }
    }
}

impl<'a> Iterator for TreeIter<'a> {
    type Item = &'a MetaNode;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(id) = self.pending.pop_front() {
                match self.graph.get_node(id) {
                    Some(node) => return Some(node),
                    None => continue,
                }
            }
            let dir = self.graph.get_node(self.stack.pop()?)?;
            if matches!(self.select, Select::Files | Select::All) {
                self.pending.extend(dir.files());
            }
            if matches!(self.select, Select::Dirs | Select::All) {
                self.pending.extend(dir.directories());
            }
            if self.recursive {
                self.stack.extend(dir.directories().iter().rev());
            }
        }
    }
}

/// A borrowed view of one directory node (or the root) inside a [`MetaGraph`].
#[derive(Debug, Clone, Copy)]
pub struct DirView<'a> {
    graph: &'a MetaGraph,
    node: &'a MetaNode,
}

impl MetaGraph {
    pub fn root(&self) -> DirView<'_> {
        DirView {
            graph: self,
            node: self.root_node(),
        }
    }

    pub fn dir(&self, id: NodeId) -> Result<DirView<'_>, MetagraphError> {
        let node = self.node(id)?;
        if !node.is_dir() {
            return Err(MetagraphError::NotFound(format!(
                "{node} is not a directory node"
            )));
        }
        Ok(DirView { graph: self, node })
    }

    /// Indented rendering of the whole tree followed by the free-standing metadata nodes.
    pub fn pformat(&self) -> String {
        let mut out = self.root().pformat(0, 2);
        for meta in self.metas() {
            out.push_str(&format!("{}{}\n", " ".repeat(2), meta));
        }
        out
    }

    pub fn pprint(&self) {
        print!("{}", self.pformat());
    }
}

impl<'a> DirView<'a> {
    pub fn id(&self) -> NodeId {
        self.node.id()
    }

    pub fn node(&self) -> &'a MetaNode {
        self.node
    }

    pub fn path(&self) -> &'a Path {
        self.node.path().unwrap_or_else(|| Path::new(""))
    }

    pub fn get_files(&self, recursive: bool) -> TreeIter<'a> {
        TreeIter::new(self.graph, self.node.id(), Select::Files, recursive)
    }

    pub fn get_dirs(&self, recursive: bool) -> TreeIter<'a> {
        TreeIter::new(self.graph, self.node.id(), Select::Dirs, recursive)
    }

    pub fn get_all(&self, recursive: bool) -> TreeIter<'a> {
        TreeIter::new(self.graph, self.node.id(), Select::All, recursive)
    }

    fn children(&self, ids: &'a [NodeId]) -> impl Iterator<Item = &'a MetaNode> + 'a {
        let graph = self.graph;
        ids.iter().filter_map(move |id| graph.get_node(*id))
    }

    fn matches(&self, child: &MetaNode, name: &str, lookup: &Lookup) -> bool {
        if !lookup.accepts(child) {
            return false;
        }
        if child.name() == Some(name) {
            return true;
        }
        self.graph
            .relative_to(child.id(), None)
            .map(|rel| os_path_to_string(rel) == name)
            .unwrap_or(false)
    }

    /// First node named `name` (by file name, or by path relative to its parent): this level's
    /// files, then this level's directories, then each subdirectory in order if recursive.
    pub fn find(&self, name: &str, lookup: &Lookup) -> Option<&'a MetaNode> {
        if let Some(found) = self
            .children(self.node.files())
            .chain(self.children(self.node.directories()))
            .find(|child| self.matches(child, name, lookup))
        {
            return Some(found);
        }
        if lookup.recursive {
            for sub in self.children(self.node.directories()) {
                let view = DirView {
                    graph: self.graph,
                    node: sub,
                };
                if let Some(found) = view.find(name, lookup) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// Like [`DirView::find`] but a miss is a [`MetagraphError::NotFound`].
    pub fn get(&self, name: &str, lookup: &Lookup) -> Result<&'a MetaNode, MetagraphError> {
        self.find(name, lookup).ok_or_else(|| {
            MetagraphError::NotFound(format!("'{}' under {:?}", name, self.path()))
        })
    }

    pub fn get_dir(&self, name: &str) -> Result<DirView<'a>, MetagraphError> {
        let node = self.get(name, &Lookup::dirs())?;
        Ok(DirView {
            graph: self.graph,
            node,
        })
    }

    pub fn get_file(&self, name: &str) -> Result<&'a MetaNode, MetagraphError> {
        self.get(name, &Lookup::files())
    }

    /// Render this directory and everything below it, one node per line, indenting each level
    /// by `indent` spaces starting at `level`.
    pub fn pformat(&self, level: usize, indent: usize) -> String {
        let mut out = String::new();
        self.write_tree(&mut out, level, indent);
        out
    }

    fn write_tree(&self, out: &mut String, level: usize, indent: usize) {
        let pad = " ".repeat(level * indent);
        if self.node.parent_id().is_none() {
            out.push_str(&format!(
                "{}{}({})\n",
                pad,
                self.node.type_tag(),
                self.path().display()
            ));
        } else {
            out.push_str(&format!("{}{}\n", pad, self.node));
        }
        let child_pad = " ".repeat((level + 1) * indent);
        for file in self.children(self.node.files()) {
            out.push_str(&format!("{child_pad}{file}\n"));
        }
        for sub in self.children(self.node.directories()) {
            DirView {
                graph: self.graph,
                node: sub,
            }
            .write_tree(out, level + 1, indent);
        }
    }
}
