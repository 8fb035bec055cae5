//! Building graphs from directories on disk.

mod common;

use metagraph_core::{config::GraphConfig, metagraph::Lookup, MetaGraph, MetagraphError};
use tempfile::tempdir;
use test_log::test;

use common::create_test_tree;

fn names<'a>(iter: impl Iterator<Item = &'a metagraph_core::MetaNode>) -> Vec<String> {
    iter.filter_map(|n| n.name().map(str::to_string)).collect()
}

#[test]
fn sorted_scan_mirrors_the_tree() {
    let temp = tempdir().unwrap();
    let root = create_test_tree(&temp);
    let config = GraphConfig {
        sort_entries: true,
        ..Default::default()
    };
    let graph = MetaGraph::create_from_directory_with(&root, config).unwrap();

    // root + .cache, blob, notes.txt, raw, a.html, b.html, text, nested, c.txt
    assert_eq!(graph.node_count(), 10);
    assert_eq!(graph.root_path(), root.as_path());
    assert_eq!(names(graph.root().get_dirs(false)), vec![".cache", "raw", "text"]);
    assert_eq!(
        names(graph.root().get_files(true)),
        vec!["notes.txt", "blob", "a.html", "b.html", "c.txt"]
    );

    let c = graph.root().get_file("c.txt").unwrap();
    assert_eq!(c.path(), Some(root.join("text/nested/c.txt").as_path()));
    let nested = graph.parent(c.id()).unwrap().unwrap();
    assert_eq!(nested.name(), Some("nested"));
}

#[test]
fn hidden_entries_can_be_skipped() {
    let temp = tempdir().unwrap();
    let root = create_test_tree(&temp);
    let config = GraphConfig {
        sort_entries: true,
        skip_hidden: true,
        ..Default::default()
    };
    let graph = MetaGraph::create_from_directory_with(&root, config).unwrap();

    assert_eq!(graph.node_count(), 8);
    assert!(graph.root().find(".cache", &Lookup::default()).is_none());
    assert!(graph.root().find("blob", &Lookup::default()).is_none());
}

#[test]
fn scanning_a_missing_directory_fails() {
    let temp = tempdir().unwrap();
    let err = MetaGraph::create_from_directory(temp.path().join("absent")).unwrap_err();
    assert!(matches!(err, MetagraphError::NotFound(_)));

    let file = temp.path().join("plain.txt");
    std::fs::write(&file, "x").unwrap();
    assert!(MetaGraph::create_from_directory(&file).is_err());
}

#[test]
fn populate_a_directory_added_later() {
    let temp = tempdir().unwrap();
    let root = create_test_tree(&temp);
    let mut graph = MetaGraph::new(&root).unwrap();
    let raw = graph.get_or_create_dir(graph.root_id(), "raw").unwrap();
    assert_eq!(graph.populate_from_directory(raw).unwrap(), 2);
    assert_eq!(graph.node(raw).unwrap().files().len(), 2);
    assert!(graph.root().get_file("a.html").is_ok());
}

#[cfg(unix)]
#[test]
fn symlinked_directories_become_directory_nodes() {
    let temp = tempdir().unwrap();
    let root = temp.path().join("p");
    std::fs::create_dir_all(root.join("real")).unwrap();
    std::fs::write(root.join("real/f.txt"), "f").unwrap();
    std::os::unix::fs::symlink(root.join("real"), root.join("link")).unwrap();

    let config = GraphConfig {
        sort_entries: true,
        ..Default::default()
    };
    let graph = MetaGraph::create_from_directory_with(&root, config).unwrap();
    let link = graph.root().get_dir("link").unwrap();
    assert!(link.node().is_dir());
    // not followed by default, so nothing below the link
    assert_eq!(link.get_all(true).count(), 0);
    assert_eq!(graph.root().get_files(true).count(), 1);

    let followed = GraphConfig {
        sort_entries: true,
        follow_links: true,
        ..Default::default()
    };
    let graph = MetaGraph::create_from_directory_with(&root, followed).unwrap();
    let link = graph.root().get_dir("link").unwrap();
    assert_eq!(names(link.get_files(false)), vec!["f.txt"]);
}
