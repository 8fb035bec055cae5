//! Shared test utilities for MetaGraph testing

use crate::{
    metagraph::MetaGraph,
    properties::{MetaNode, NodeId},
};

/// Initialize logging for tests
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

/// Ids of the nodes built by [create_test_graph].
pub struct TestIds {
    pub root: NodeId,
    pub a: NodeId,
    pub b_txt: NodeId,
    pub c: NodeId,
    pub d_txt: NodeId,
    pub top_txt: NodeId,
}

/// In-memory graph rooted at `/project`:
///
/// ```text
/// /project
///   top.txt
///   a/
///     b.txt
///     c/
///       d.txt
/// ```
pub fn create_test_graph() -> (MetaGraph, TestIds) {
    init_logging();

    let mut graph = MetaGraph::new("/project").unwrap();
    let root = graph.root_id();
    let top_txt = graph.add_file(root, MetaNode::file("top.txt")).unwrap();
    let a = graph.add_dir(root, MetaNode::dir("a")).unwrap();
    let b_txt = graph.add_file(a, MetaNode::file("b.txt")).unwrap();
    let c = graph.add_dir(a, MetaNode::dir("c")).unwrap();
    let d_txt = graph.add_file(c, MetaNode::file("d.txt")).unwrap();

    (
        graph,
        TestIds {
            root,
            a,
            b_txt,
            c,
            d_txt,
            top_txt,
        },
    )
}

/// Three metadata nodes where `c` derives from `b` and `b` from `a`. Returns `[a, b, c]`.
pub fn create_provenance_chain(graph: &mut MetaGraph) -> [NodeId; 3] {
    let a = graph.add_meta(MetaNode::meta()).unwrap();
    let b = graph.add_meta(MetaNode::meta()).unwrap();
    let c = graph.add_meta(MetaNode::meta()).unwrap();
    graph.add_origin(b, a).unwrap();
    graph.add_origin(c, b).unwrap();
    [a, b, c]
}
