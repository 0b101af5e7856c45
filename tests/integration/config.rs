//! Integration tests for configuration handling.

use noodle::test_utils::{LayerFixture, SceneFixture};
use predicates::prelude::*;

use crate::common::TestScene;

fn bare_reference_scene() -> SceneFixture {
    SceneFixture {
        root: "shot/root.usda".to_string(),
        files: vec![
            LayerFixture::new(
                "shot/root.usda",
                "#usda 1.0\n\ndef \"Prop\" (\n    references = @props/lamp.usda@\n)\n{\n}\n",
            ),
            LayerFixture::new(
                "library/props/lamp.usda",
                "#usda 1.0\n\ndef \"Lamp\"\n{\n    asset inputs:file = @./lamp.png@\n}\n",
            ),
            LayerFixture::raw("library/props/lamp.png", b"\x89PNG\r\n\x1a\n"),
        ],
    }
}

#[test]
fn test_config_file_sets_walk_defaults() {
    let scene = TestScene::new(&bare_reference_scene()).unwrap();
    let library = scene.path("library").to_string_lossy().replace('\\', "/");
    scene
        .write_config(&format!("search_paths = [\"{library}\"]\nwalk_attributes = true\n"))
        .unwrap();

    scene
        .command()
        .args(["graph", &scene.root_arg(), "-f", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("library/props/lamp.usda"))
        .stdout(predicate::str::contains("texture").and(predicate::str::contains("lamp.png")))
        .stdout(predicate::str::contains("(offline)").not());
}

#[test]
fn test_search_path_environment_variable() {
    let scene = TestScene::new(&bare_reference_scene()).unwrap();

    scene
        .command()
        .env("NOODLE_SEARCH_PATH", scene.path("library"))
        .args(["check", &scene.root_arg()])
        .assert()
        .success();
}

#[test]
fn test_explicit_config_flag_must_exist() {
    let scene = TestScene::shot().unwrap();

    scene
        .command()
        .args(["--config", "missing.toml", "graph", &scene.root_arg()])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Configuration file not found"));
}

#[test]
fn test_invalid_config_is_reported() {
    let scene = TestScene::shot().unwrap();
    scene.write_config("max_depth = \"deep\"\n").unwrap();

    scene
        .command()
        .args(["graph", &scene.root_arg()])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("max_depth"));
}
