use assert_cmd::prelude::*;
use predicates::str::contains;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

#[test]
fn headless_run_prints_scene_summary() {
    let mut cmd = Command::cargo_bin("orbit-scene").expect("binary exists");
    cmd.args(["--headless", "--frames", "3"]);
    cmd.assert()
        .success()
        .stdout(contains("Loaded scene with 5 objects (2 lights)"))
        .stdout(contains(" - box (mesh)"))
        .stdout(contains(" - ground (mesh)"))
        .stdout(contains("Rendered 3 frame(s): 2 draw calls, 1 shadow caster(s), 1 shadow receiver(s)"));
}

#[test]
fn pixel_ratio_is_capped_at_two() {
    let mut cmd = Command::cargo_bin("orbit-scene").expect("binary exists");
    cmd.args([
        "--headless",
        "--width",
        "800",
        "--height",
        "600",
        "--pixel-ratio",
        "3",
    ]);
    cmd.assert()
        .success()
        .stdout(contains("Drawing buffer 1600x1200 at pixel ratio 2"));
}

#[test]
fn dump_scene_writes_json() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("scene.json");
    let mut cmd = Command::cargo_bin("orbit-scene").expect("binary exists");
    cmd.arg("--headless").arg("--dump-scene").arg(&path);
    cmd.assert().success();

    let json = fs::read_to_string(&path).expect("scene dump");
    let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
    let children = value["children"].as_array().expect("children array");
    assert_eq!(children.len(), 5);
    assert!(children
        .iter()
        .any(|child| child["type"] == "mesh" && child["name"] == "box"));
    assert!(children
        .iter()
        .any(|child| child["type"] == "camera" && child["fov"] == 60.0));
}

#[test]
fn unknown_flags_are_rejected() {
    let mut cmd = Command::cargo_bin("orbit-scene").expect("binary exists");
    cmd.arg("--fullscreen");
    cmd.assert()
        .failure()
        .stderr(contains("Unknown argument: --fullscreen"));
}
