use super::helpers::{create_provenance_chain, create_test_graph};
use crate::{
    metagraph::{MetaGraph, SourceDepth},
    properties::{MetaNode, NodeId},
};

fn sources(graph: &MetaGraph, id: NodeId, depth: SourceDepth) -> Vec<NodeId> {
    graph.get_sources(id, depth).unwrap().map(|n| n.id()).collect()
}

#[test]
fn source_depths_on_a_chain() {
    let (mut graph, _) = create_test_graph();
    let [a, b, c] = create_provenance_chain(&mut graph);

    assert_eq!(sources(&graph, c, SourceDepth::Shallow), vec![b]);
    assert_eq!(sources(&graph, c, SourceDepth::All), vec![b, a]);
    assert_eq!(sources(&graph, c, SourceDepth::Deepest), vec![a]);
    assert!(sources(&graph, a, SourceDepth::All).is_empty());
}

#[test]
fn diamond_ancestors_repeat_per_path() {
    // d <- b <- a, d <- c <- a
    let mut graph = MetaGraph::new("/p").unwrap();
    let a = graph.add_meta(MetaNode::meta()).unwrap();
    let b = graph.add_meta(MetaNode::meta()).unwrap();
    let c = graph.add_meta(MetaNode::meta()).unwrap();
    let d = graph.add_meta(MetaNode::meta()).unwrap();
    graph.add_origin(b, a).unwrap();
    graph.add_origin(c, a).unwrap();
    graph.add_origin(d, b).unwrap();
    graph.add_origin(d, c).unwrap();

    assert_eq!(sources(&graph, d, SourceDepth::All), vec![b, a, c, a]);
    assert_eq!(sources(&graph, d, SourceDepth::Deepest), vec![a, a]);
    assert!(graph.find_provenance_cycles().is_empty());
}

#[test]
fn origins_cross_the_tree_and_metas() {
    let (mut graph, ids) = create_test_graph();
    let session = graph.add_meta(MetaNode::meta()).unwrap();
    graph.add_origin(ids.d_txt, ids.b_txt).unwrap();
    graph.add_origin(ids.b_txt, session).unwrap();

    assert_eq!(
        sources(&graph, ids.d_txt, SourceDepth::All),
        vec![ids.b_txt, session]
    );
    let derived: Vec<_> = graph
        .get_derived(session)
        .unwrap()
        .map(|n| n.id())
        .collect();
    assert_eq!(derived, vec![ids.b_txt]);
}

#[test]
fn cycles_are_reported_not_prevented() {
    let mut graph = MetaGraph::new("/p").unwrap();
    let [a, _, c] = create_provenance_chain(&mut graph);
    graph.add_origin(a, c).unwrap();

    let cycles = graph.find_provenance_cycles();
    assert_eq!(cycles.len(), 1);
    assert_eq!(cycles[0].len(), 3);
    assert_eq!(sources(&graph, a, SourceDepth::Shallow), vec![c]);
}

#[test]
fn self_derivation_is_a_cycle() {
    let mut graph = MetaGraph::new("/p").unwrap();
    let a = graph.add_meta(MetaNode::meta()).unwrap();
    graph.add_origin(a, a).unwrap();
    assert_eq!(graph.find_provenance_cycles(), vec![vec![a]]);
}
