//! Provenance ("derived from") edges between nodes.
//!
//! Origin edges may connect any two nodes of a graph, tree-adjacent or not. They are expected to
//! form a DAG, but acyclicity is never enforced: [`MetaGraph::find_provenance_cycles`] reports
//! cycles on request, and a cyclic graph makes [`SourceDepth::All`] walks endless.

use petgraph::{algo::tarjan_scc, graphmap::DiGraphMap};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::MetaGraph;
use crate::{
    error::MetagraphError,
    properties::{MetaNode, NodeId},
};

/// Provenance graph with edges pointing from a derived node to each of its origins. Edge weights
/// count how many times the origin was recorded.
pub type ProvenanceGraph = DiGraphMap<NodeId, usize>;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceDepth {
    /// The node's own origins.
    #[default]
    Shallow,
    /// Every ancestor, pre-order.
    All,
    /// Ancestors that have no origins of their own.
    Deepest,
}

impl FromStr for SourceDepth {
    type Err = MetagraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().trim() {
            "shallow" => Ok(SourceDepth::Shallow),
            "all" => Ok(SourceDepth::All),
            "deepest" => Ok(SourceDepth::Deepest),
            other => Err(MetagraphError::Config(format!(
                "unknown source depth '{other}', expected shallow, all or deepest"
            ))),
        }
    }
}

/// Lazy walk over the provenance ancestors of a node. See [`MetaGraph::get_sources`].
#[derive(Debug, Clone)]
pub struct Sources<'a> {
    graph: &'a MetaGraph,
    depth: SourceDepth,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Sources<'a> {
    type Item = &'a MetaNode;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let node = match self.graph.get_node(self.stack.pop()?) {
                Some(node) => node,
                None => continue,
            };
            if self.depth != SourceDepth::Shallow {
                self.stack.extend(node.origin_ids().iter().rev());
            }
            if self.depth == SourceDepth::Deepest && !node.origin_ids().is_empty() {
                continue;
            }
            return Some(node);
        }
    }
}

/// Nodes listing a given node among their origins. See [`MetaGraph::get_derived`].
#[derive(Debug, Clone)]
pub struct Derived<'a> {
    nodes: std::slice::Iter<'a, MetaNode>,
    origin: NodeId,
}

impl<'a> Iterator for Derived<'a> {
    type Item = &'a MetaNode;

    fn next(&mut self) -> Option<Self::Item> {
        let origin = self.origin;
        self.nodes
            .by_ref()
            .find(|node| node.origin_ids().contains(&origin))
    }
}

impl MetaGraph {
    /// Record that `node` was derived from `origin` and return the origin's id.
    ///
    /// Recording the same pair twice stores a duplicate edge.
    pub fn add_origin(&mut self, node: NodeId, origin: NodeId) -> Result<NodeId, MetagraphError> {
        self.idx(origin)?;
        let idx = self.idx(node)?;
        self.nodes[idx].origin_ids.push(origin);
        tracing::debug!("add_origin: {} derived from {}", node, origin);
        Ok(origin)
    }

    /// Provenance ancestors of `node` at the requested depth. Empty when `node` has no origins.
    ///
    /// An ancestor reachable along several paths is yielded once per path.
    pub fn get_sources(
        &self,
        node: NodeId,
        depth: SourceDepth,
    ) -> Result<Sources<'_>, MetagraphError> {
        let node = self.node(node)?;
        Ok(Sources {
            graph: self,
            depth,
            stack: node.origin_ids().iter().rev().copied().collect(),
        })
    }

    /// Every node that lists `origin` among its origins, in insertion order.
    pub fn get_derived(&self, origin: NodeId) -> Result<Derived<'_>, MetagraphError> {
        self.idx(origin)?;
        Ok(Derived {
            nodes: self.nodes.iter(),
            origin,
        })
    }

    pub fn provenance_graph(&self) -> ProvenanceGraph {
        let mut graph = ProvenanceGraph::new();
        for node in self.nodes.iter() {
            graph.add_node(node.id());
            for origin in node.origin_ids() {
                if let Some(count) = graph.edge_weight_mut(node.id(), *origin) {
                    *count += 1;
                } else {
                    graph.add_edge(node.id(), *origin, 1);
                }
            }
        }
        graph
    }

    /// Groups of nodes that derive from each other in a cycle. Empty for a proper DAG.
    pub fn find_provenance_cycles(&self) -> Vec<Vec<NodeId>> {
        let graph = self.provenance_graph();
        tarjan_scc(&graph)
            .into_iter()
            .filter(|scc| scc.len() > 1 || graph.contains_edge(scc[0], scc[0]))
            .collect()
    }
}
