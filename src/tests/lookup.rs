use std::path::Path;

use super::helpers::create_test_graph;
use crate::{
    error::MetagraphError,
    metagraph::Lookup,
    paths::normalize,
    properties::MetaNode,
};

#[test]
fn nested_and_recursive_lookups_agree() {
    let (graph, ids) = create_test_graph();
    let root = graph.root();

    let via_dir = root.get_dir("a").unwrap().get_file("b.txt").unwrap();
    let direct = root.get_file("b.txt").unwrap();
    assert_eq!(via_dir.id(), ids.b_txt);
    assert_eq!(direct.id(), ids.b_txt);
    assert_eq!(root.get_file("d.txt").unwrap().id(), ids.d_txt);
}

#[test]
fn lookup_by_relative_path() {
    let (graph, ids) = create_test_graph();
    let a = graph.dir(ids.a).unwrap();
    assert_eq!(a.get_dir("c").unwrap().id(), ids.c);
    assert_eq!(
        graph.root().find("top.txt", &Lookup::files().shallow()).map(|n| n.id()),
        Some(ids.top_txt)
    );
    assert!(graph.dir(ids.top_txt).is_err());
}

#[test]
fn missing_names_are_not_found() {
    let (graph, _) = create_test_graph();
    let root = graph.root();
    assert!(root.find("missing.txt", &Lookup::default()).is_none());
    assert!(matches!(
        root.get("missing.txt", &Lookup::default()),
        Err(MetagraphError::NotFound(_))
    ));
    assert!(root.get_dir("b.txt").is_err());
    assert!(root.get_file("a").is_err());
}

#[test]
fn same_named_siblings_are_kept_and_first_wins() {
    let (mut graph, ids) = create_test_graph();
    let second = graph.add_dir(ids.root, MetaNode::dir("a")).unwrap();
    assert_ne!(second, ids.a);
    assert_eq!(graph.node(ids.root).unwrap().directories(), &[ids.a, second]);
    assert_eq!(graph.root().get_dir("a").unwrap().id(), ids.a);
}

#[test]
fn create_form_never_deduplicates() {
    let (mut graph, ids) = create_test_graph();
    let first = graph.get_or_create_dir(ids.root, "x").unwrap();
    let second = graph.get_or_create_dir(ids.root, "x").unwrap();
    assert_ne!(first, second);
    // a/ plus the two x/ siblings
    assert_eq!(graph.node(ids.root).unwrap().directories().len(), 3);
    assert_eq!(graph.root().get_dir("x").unwrap().id(), first);

    let created = graph.get_or_create_file(ids.a, "new.txt").unwrap();
    assert_eq!(
        graph.node(created).unwrap().path(),
        Some(Path::new("/project/a/new.txt"))
    );
    // an existing name deeper down does not stop creation at this level
    let c = graph.get_or_create_dir(ids.root, "c").unwrap();
    assert_ne!(c, ids.c);
    assert_eq!(graph.parent(c).unwrap().map(|p| p.id()), Some(ids.root));
}

#[test]
fn every_path_is_its_parent_path_joined_with_its_relative_path() {
    let (graph, _) = create_test_graph();
    for node in graph.root().get_all(true) {
        let parent = graph.parent(node.id()).unwrap().unwrap();
        let rel = graph.relative_to(node.id(), None).unwrap();
        assert_eq!(
            node.path().unwrap(),
            normalize(parent.path().unwrap().join(rel))
        );
    }
}

#[test]
fn graph_pformat_lists_metas_after_the_tree() {
    let (mut graph, _) = create_test_graph();
    let meta = graph
        .add_meta(MetaNode::meta().with_type_tag("MetaNode"))
        .unwrap();
    let out = graph.pformat();
    assert!(out.starts_with("RootMeta(/project)\n"));
    assert!(out.ends_with(&format!("  MetaNode({meta})\n")));
}
