//! Walks over scenes on disk through the filesystem composition service.

use noodle::graph::{EdgeKind, NodeKind};
use noodle::service::FsCompositionService;
use noodle::test_utils::{SceneFixture, init_test_logging};
use noodle::utils::paths::canonical_key;
use noodle::walker::{DependencyWalker, WalkOptions};
use std::path::Path;
use tempfile::TempDir;

fn key(dir: &Path, relative: &str) -> String {
    canonical_key(&dir.join(relative).to_string_lossy())
}

#[test]
fn test_shot_scene_without_attributes() {
    init_test_logging(None);
    let temp = TempDir::new().unwrap();
    let root = SceneFixture::shot().write_to(temp.path()).unwrap();
    let dir = temp.path();

    let graph = DependencyWalker::new(FsCompositionService::new())
        .build(&root.to_string_lossy())
        .unwrap();

    assert!(graph.root_resolved());
    assert_eq!(graph.node_count(), 9);

    let offline: Vec<&str> = graph.offline_nodes().iter().map(|n| n.key.as_str()).collect();
    assert_eq!(offline, vec![key(dir, "assets/blue.usda").as_str()]);

    let root_key = key(dir, "shot/root.usda");
    let layout = key(dir, "shot/layout.usda");
    let look = format!("{layout}:look");
    assert!(graph.has_edge(&root_key, &layout, &EdgeKind::Sublayer));
    assert!(graph.has_edge(&root_key, &key(dir, "assets/tree.usda"), &EdgeKind::Reference));
    assert!(graph.has_edge(&layout, &key(dir, "assets/set_geo.usda"), &EdgeKind::Payload));
    assert!(graph.has_edge(&layout, &look, &EdgeKind::Variant));
    assert!(graph.has_edge(
        &look,
        &key(dir, "assets/red.usda"),
        &EdgeKind::VariantMember("red".to_string())
    ));
    assert!(graph.has_edge(
        &look,
        &key(dir, "assets/blue.usda"),
        &EdgeKind::VariantMember("blue".to_string())
    ));

    let clip = graph.node("../cache/crowd.1001-1003.usd").unwrap();
    assert!(clip.online);
    assert_eq!(clip.resolved_path, key(dir, "cache/crowd.1001.usd"));
    assert!(graph.has_edge(
        "../cache/crowd.1001-1003.usd",
        &key(dir, "cache/manifest.usda"),
        &EdgeKind::Manifest
    ));

    let root_info = graph.root_node().unwrap().layer_info().unwrap();
    assert_eq!(root_info.default_prim.as_deref(), Some("World"));
    assert_eq!(root_info.documentation.as_deref(), Some("Shot root"));
}

#[test]
fn test_shot_scene_with_attributes() {
    let temp = TempDir::new().unwrap();
    let root = SceneFixture::shot().write_to(temp.path()).unwrap();

    let graph = DependencyWalker::new(FsCompositionService::new())
        .with_options(WalkOptions::default().with_attributes(true))
        .build(&root.to_string_lossy())
        .unwrap();

    assert_eq!(graph.node_count(), 10);
    let bark = key(temp.path(), "assets/textures/bark.png");
    let texture = graph.node(&bark).unwrap();
    assert!(texture.online);
    assert_eq!(
        texture.kind,
        NodeKind::Texture {
            color_space: Some("sRGB".to_string())
        }
    );
    assert!(graph.has_edge(&key(temp.path(), "assets/tree.usda"), &bark, &EdgeKind::Texture));
}

#[test]
fn test_walk_is_idempotent_on_disk() {
    let temp = TempDir::new().unwrap();
    let root = SceneFixture::shot().write_to(temp.path()).unwrap();
    let walker = DependencyWalker::new(FsCompositionService::new());

    let first = walker.build(&root.to_string_lossy()).unwrap();
    let second = walker.build(&root.to_string_lossy()).unwrap();

    assert_eq!(first.node_map(), second.node_map());
    assert_eq!(first.edges(), second.edges());
}

#[test]
fn test_cycle_on_disk() {
    let temp = TempDir::new().unwrap();
    let root = SceneFixture::cycle().write_to(temp.path()).unwrap();

    let graph = DependencyWalker::new(FsCompositionService::new())
        .build(&root.to_string_lossy())
        .unwrap();

    let a = key(temp.path(), "a.usda");
    let b = key(temp.path(), "b.usda");
    assert_eq!(graph.node_count(), 2);
    assert!(graph.has_edge(&a, &b, &EdgeKind::Sublayer));
    assert!(graph.has_edge(&b, &a, &EdgeKind::Sublayer));
    assert_eq!(graph.node(&a).unwrap().kind.name(), "root");
}

#[test]
fn test_missing_root_on_disk() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("missing.usda");

    let graph = DependencyWalker::new(FsCompositionService::new())
        .build(&missing.to_string_lossy())
        .unwrap();

    assert!(!graph.root_resolved());
    assert_eq!(graph.node_count(), 1);
    assert!(!graph.root_node().unwrap().online);
}

#[test]
fn test_dot_export_of_scene() {
    let temp = TempDir::new().unwrap();
    let root = SceneFixture::shot().write_to(temp.path()).unwrap();

    let graph = DependencyWalker::new(FsCompositionService::new())
        .build(&root.to_string_lossy())
        .unwrap();

    let digraph = graph.to_digraph();
    assert_eq!(digraph.node_count(), graph.node_count());
    assert_eq!(digraph.edge_count(), graph.edge_count());

    let dot = graph.to_dot();
    assert!(dot.contains("blue.usda"));
    assert!(dot.contains("color = red"));
}
