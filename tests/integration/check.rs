//! Integration tests for the `noodle check` command.

use noodle::test_utils::{LayerFixture, SceneFixture};
use predicates::prelude::*;

use crate::common::TestScene;

#[test]
fn test_check_reports_offline_and_fails() {
    let scene = TestScene::shot().unwrap();

    let output = scene.run_noodle(&["check", &scene.root_arg()]).unwrap();
    output
        .assert_failure()
        .assert_stdout_contains("9 nodes")
        .assert_stdout_contains("1 offline:")
        .assert_stdout_contains("payload")
        .assert_stdout_contains("assets/blue.usda")
        .assert_stdout_contains(":look (blue)")
        .assert_stderr_contains("1 offline dependencies found");
}

#[test]
fn test_check_clean_scene_succeeds() {
    let scene = TestScene::new(&SceneFixture::cycle()).unwrap();

    scene
        .command()
        .args(["check", &scene.root_arg()])
        .assert()
        .success()
        .stdout(predicate::str::contains("All dependencies are online"));
}

#[test]
fn test_check_textures_flag_adds_missing_textures() {
    let scene = TestScene::new(&SceneFixture {
        root: "look.usda".to_string(),
        files: vec![LayerFixture::new(
            "look.usda",
            "#usda 1.0\n\ndef Shader \"Tex\"\n{\n    asset inputs:file = @./maps/missing.exr@\n}\n",
        )],
    })
    .unwrap();

    scene.command().args(["check", &scene.root_arg()]).assert().success();

    scene
        .command()
        .args(["check", &scene.root_arg(), "-t"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("texture"))
        .stdout(predicate::str::contains("maps/missing.exr"));
}

#[test]
fn test_check_quiet_prints_only_the_error() {
    let scene = TestScene::shot().unwrap();

    let output = scene.run_noodle(&["--quiet", "check", &scene.root_arg()]).unwrap();
    output.assert_failure().assert_stderr_contains("offline dependencies found");
    assert!(output.stdout.is_empty());
}

#[test]
fn test_check_missing_root() {
    let scene = TestScene::shot().unwrap();

    scene
        .command()
        .args(["check", "nope.usda"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Cannot open root layer"))
        .stderr(predicate::str::contains("suggestion"));
}
