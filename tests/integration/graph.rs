//! Integration tests for the `noodle graph` command.

use noodle::test_utils::{LayerFixture, SceneFixture};
use noodle::utils::paths::canonical_key;
use predicates::prelude::*;

use crate::common::TestScene;

fn key(scene: &TestScene, relative: &str) -> String {
    canonical_key(&scene.path(relative).to_string_lossy())
}

#[test]
fn test_graph_tree_default() {
    let scene = TestScene::shot().unwrap();

    let output = scene.run_noodle(&["graph", &scene.root_arg()]).unwrap();
    output
        .assert_success()
        .assert_stdout_contains("root.usda")
        .assert_stdout_contains("├── layout.usda sublayer")
        .assert_stdout_contains("│   ├── set_geo.usda payload")
        .assert_stdout_contains("│   └── look variant [red]")
        .assert_stdout_contains("├── red.usda red")
        .assert_stdout_contains("└── blue.usda blue (offline)")
        .assert_stdout_contains("├── tree.usda reference")
        .assert_stdout_contains("└── crowd.1001-1003.usd clip [3 frames]")
        .assert_stdout_contains("└── manifest.usda manifest");

    // Textures are opt-in
    assert!(!output.stdout.contains("bark.png"));
}

#[test]
fn test_graph_usdfile_flag_and_textures() {
    let scene = TestScene::shot().unwrap();

    scene
        .command()
        .args(["graph", "-i", &scene.root_arg(), "--textures"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bark.png texture [sRGB]"));
}

#[test]
fn test_graph_text_format() {
    let scene = TestScene::shot().unwrap();

    let output = scene.run_noodle(&["graph", &scene.root_arg(), "--format", "text"]).unwrap();
    output
        .assert_success()
        .assert_stdout_contains(&format!("root {}\n", key(&scene, "shot/root.usda")))
        .assert_stdout_contains(&format!("  sublayer {}\n", key(&scene, "shot/layout.usda")))
        .assert_stdout_contains(&format!(
            "      blue {} (offline)\n",
            key(&scene, "assets/blue.usda")
        ))
        .assert_stdout_contains("  clip ../cache/crowd.1001-1003.usd\n");
}

#[test]
fn test_graph_json_format() {
    let scene = TestScene::shot().unwrap();

    let output = scene.run_noodle(&["graph", &scene.root_arg(), "-f", "json"]).unwrap();
    output.assert_success();

    let value: serde_json::Value = serde_json::from_str(&output.stdout).unwrap();
    assert_eq!(value["root"], key(&scene, "shot/root.usda").as_str());
    assert_eq!(value["root_resolved"], true);

    let nodes = value["nodes"].as_object().unwrap();
    assert_eq!(nodes.len(), 9);

    let blue = &nodes[&key(&scene, "assets/blue.usda")];
    assert_eq!(blue["kind"], "payload");
    assert_eq!(blue["online"], false);

    let look = &nodes[&format!("{}:look", key(&scene, "shot/layout.usda"))];
    assert_eq!(look["kind"], "variant");
    assert_eq!(look["selected"], "red");
}

#[test]
fn test_graph_dot_format() {
    let scene = TestScene::shot().unwrap();

    scene
        .command()
        .args(["graph", &scene.root_arg(), "--format", "dot"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("digraph"))
        .stdout(predicate::str::contains("color = red"))
        .stdout(predicate::str::contains("style = dotted"));
}

#[test]
fn test_graph_display_depth() {
    let scene = TestScene::shot().unwrap();

    let output = scene.run_noodle(&["graph", &scene.root_arg(), "--depth", "1"]).unwrap();
    output.assert_success().assert_stdout_contains("layout.usda sublayer");
    assert!(!output.stdout.contains("set_geo.usda"));
    assert!(!output.stdout.contains("manifest.usda"));
}

#[test]
fn test_graph_max_depth_limits_walk() {
    let scene = TestScene::shot().unwrap();

    let output = scene
        .run_noodle(&["graph", &scene.root_arg(), "--max-depth", "0", "-f", "text"])
        .unwrap();
    // layout.usda is recorded but never opened
    output.assert_success().assert_stdout_contains("layout.usda");
    assert!(!output.stdout.contains("set_geo.usda"));
    assert!(!output.stdout.contains("blue.usda"));
}

#[test]
fn test_graph_cycle_terminates() {
    let scene = TestScene::new(&SceneFixture::cycle()).unwrap();

    scene
        .command()
        .args(["graph", &scene.root_arg(), "--no-dedupe"])
        .assert()
        .success()
        .stdout(predicate::str::contains("b.usda sublayer"))
        .stdout(predicate::str::contains("a.usda sublayer (cycle)"));
}

#[test]
fn test_graph_search_path() {
    let scene = TestScene::new(&SceneFixture {
        root: "shot/root.usda".to_string(),
        files: vec![
            LayerFixture::new(
                "shot/root.usda",
                "#usda 1.0\n\ndef \"Prop\" (\n    references = @props/chair.usda@\n)\n{\n}\n",
            ),
            LayerFixture::empty("library/props/chair.usda"),
        ],
    })
    .unwrap();

    let output = scene.run_noodle(&["graph", &scene.root_arg(), "-f", "text"]).unwrap();
    output.assert_success().assert_stdout_contains("(offline)");

    let library = scene.path("library");
    let output = scene
        .run_noodle(&[
            "graph",
            &scene.root_arg(),
            "-f",
            "text",
            "--search-path",
            &library.to_string_lossy(),
        ])
        .unwrap();
    output
        .assert_success()
        .assert_stdout_contains(&key(&scene, "library/props/chair.usda"));
    assert!(!output.stdout.contains("(offline)"));
}

#[test]
fn test_graph_missing_root() {
    let scene = TestScene::shot().unwrap();

    let output = scene.run_noodle(&["graph", "does_not_exist.usda"]).unwrap();
    output
        .assert_failure()
        .assert_stderr_contains("Cannot open root layer")
        .assert_stderr_contains("does_not_exist.usda");
}

#[test]
fn test_graph_binary_root_is_rejected() {
    let scene = TestScene::new(&SceneFixture {
        root: "crate.usd".to_string(),
        files: vec![LayerFixture::binary("crate.usd")],
    })
    .unwrap();

    scene
        .command()
        .args(["graph", &scene.root_arg()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot open root layer"));
}

#[test]
fn test_graph_invalid_format() {
    let scene = TestScene::shot().unwrap();

    scene
        .command()
        .args(["graph", &scene.root_arg(), "--format", "yaml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid output format 'yaml'"))
        .stderr(predicate::str::contains("tree, text, json, dot"));
}

#[test]
fn test_graph_requires_a_file() {
    let scene = TestScene::shot().unwrap();

    scene.command().arg("graph").assert().failure();
    scene
        .command()
        .args(["graph", &scene.root_arg(), "-i", &scene.root_arg()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}
