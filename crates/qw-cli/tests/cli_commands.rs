//! Integration tests for the qw CLI commands.
#![allow(deprecated)] // Command::cargo_bin – macro replacement not yet stable

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const QUEST: &str = r#"{
    "config": { "startLocation": "A1" },
    "locations": { "A1": "Village Square" },
    "steps": [
        { "id": "A1", "text": "The square is quiet.",
          "options": ["Visit the forge::forge_intro", "Walk east::B1"] },
        { "id": "forge_intro", "tags": ["!has_key", "+has_key"],
          "text": "The smith hands you a key.", "options": ["Back::A1"] },
        { "id": "forge_intro", "tags": ["@has_key"],
          "text": "The forge is cold.", "options": ["Back::A1"] },
        { "id": "B1", "text": "A locked gate.",
          "options": [{ "label": "Unlock", "tags": ["@has_key"], "pass": "A1" }, "Back::A1"] },
        { "id": "patch:forge_intro", "tags": ["@has_key"], "append": " Welcome back." }
    ]
}"#;

/// Write a content bundle into a fresh temp directory.
fn bundle(src: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("quest.json");
    fs::write(&path, src).unwrap();
    (dir, path)
}

fn qw() -> Command {
    let mut cmd = Command::cargo_bin("qw").unwrap();
    cmd.env("NO_COLOR", "1");
    cmd
}

// -- check -------------------------------------------------------------------

#[test]
fn check_valid_bundle() {
    let (_dir, path) = bundle(QUEST);
    qw().arg("check")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("4 steps"))
        .stdout(predicate::str::contains("3 locations"))
        .stdout(predicate::str::contains("1 patch,"))
        .stdout(predicate::str::contains("Start: A1"));
}

#[test]
fn check_malformed_json() {
    let (_dir, path) = bundle("{ \"config\": ");
    qw().arg("check")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("malformed content"));
}

#[test]
fn check_error_document() {
    let (_dir, path) = bundle(r#"{ "error": "bad" }"#);
    qw().arg("check")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("content build failed: bad"));
}

#[test]
fn check_missing_file() {
    qw().arg("check")
        .arg("/nonexistent/quest.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read"));
}

#[test]
fn check_json_summary() {
    let (_dir, path) = bundle(QUEST);
    let output = qw().args(["check", "--json"]).arg(&path).output().unwrap();
    assert!(output.status.success());
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["steps"], 4);
    assert_eq!(summary["start"], "A1");
}

#[test]
fn check_json_error_document() {
    let (_dir, path) = bundle("[1, 2");
    let output = qw().args(["check", "--json"]).arg(&path).output().unwrap();
    assert!(!output.status.success());
    let document: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(document["error"].as_str().unwrap().contains("malformed"));
}

// -- lint --------------------------------------------------------------------

#[test]
fn lint_clean_bundle() {
    let (_dir, path) = bundle(QUEST);
    qw().arg("lint")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("No problems found"));
}

#[test]
fn lint_reports_dangling_target() {
    let (_dir, path) = bundle(
        r#"{ "config": {}, "steps": [
            { "id": "A1", "options": ["Into the void::nowhere"] }
        ] }"#,
    );
    qw().arg("lint")
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::contains("targets unknown step 'nowhere'"))
        .stderr(predicate::str::contains("lint failed with errors"));
}

#[test]
fn lint_deny_warnings() {
    let (_dir, path) = bundle(
        r#"{ "config": {}, "steps": [
            { "id": "A1", "text": "Start." },
            { "id": "secret", "text": "Nobody comes here." }
        ] }"#,
    );
    qw().arg("lint").arg(&path).assert().success();
    qw().args(["lint", "--deny-warnings"])
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::contains("unreachable"))
        .stderr(predicate::str::contains("--deny-warnings"));
}

#[test]
fn lint_json_findings() {
    let (_dir, path) = bundle(
        r#"{ "config": {}, "steps": [
            { "id": "A1", "options": ["Into the void::nowhere"] }
        ] }"#,
    );
    let output = qw().args(["lint", "--json"]).arg(&path).output().unwrap();
    assert!(!output.status.success());
    let findings: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(findings[0]["severity"], "error");
    assert_eq!(findings[0]["subject"], "A1");
}

// -- steps -------------------------------------------------------------------

#[test]
fn steps_table() {
    let (_dir, path) = bundle(QUEST);
    qw().arg("steps")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("forge_intro"))
        .stdout(predicate::str::contains("virtual"))
        .stdout(predicate::str::contains("4 step variants"));
}

#[test]
fn steps_by_location_name() {
    let (_dir, path) = bundle(QUEST);
    qw().args(["steps", "--location", "village square"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("The square is quiet."))
        .stdout(predicate::str::contains("1 step variant"));
}

#[test]
fn steps_unknown_location() {
    let (_dir, path) = bundle(QUEST);
    qw().args(["steps", "-l", "Z9"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("No steps found."));
}

// -- graph -------------------------------------------------------------------

#[test]
fn graph_dot() {
    let (_dir, path) = bundle(QUEST);
    qw().args(["graph", "--format", "dot"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("digraph quest"));
}

#[test]
fn graph_json() {
    let (_dir, path) = bundle(QUEST);
    let output = qw()
        .args(["graph", "-f", "json"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());
    let graph: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(graph["nodes"].as_array().unwrap().len(), 4);
}

#[test]
fn graph_text_to_file() {
    let (dir, path) = bundle(QUEST);
    let out = dir.path().join("graph.txt");
    qw().arg("graph")
        .arg(&path)
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Graph written to"));

    let written = fs::read_to_string(&out).unwrap();
    assert!(written.contains("[A1] (root)"));
    assert!(written.contains("--Visit the forge-->"));
}

// -- roll --------------------------------------------------------------------

#[test]
fn roll_with_stat_and_tags() {
    let (_dir, path) = bundle(QUEST);
    qw().args([
        "roll", "--skill", "might,lucky", "--dc", "8", "--tag", "lucky", "--tag", "lucky",
        "--stat", "might=3", "--seed", "1",
    ])
    .arg(&path)
    .assert()
    .success()
    .stdout(predicate::str::contains("against DC 8"))
    .stdout(predicate::str::contains("SUCCESS"));
}

#[test]
fn roll_unknown_stat() {
    let (_dir, path) = bundle(QUEST);
    qw().args(["roll", "--skill", "might", "--dc", "8", "--stat", "luck=2"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown stat"));
}

// -- play --------------------------------------------------------------------

#[test]
fn play_takes_an_option() {
    let (_dir, path) = bundle(QUEST);
    qw().arg("play")
        .arg(&path)
        .write_stdin("1\ntags\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("The square is quiet."))
        .stdout(predicate::str::contains("The smith hands you a key."))
        .stdout(predicate::str::contains("has_key"))
        .stdout(predicate::str::contains("Goodbye!"));
}

#[test]
fn play_gated_option_is_refused() {
    let (_dir, path) = bundle(QUEST);
    qw().arg("play")
        .arg(&path)
        .write_stdin("2\n1\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("A locked gate."))
        .stdout(predicate::str::contains("(unavailable)"))
        .stdout(predicate::str::contains("option unavailable: Unlock"));
}

#[test]
fn play_travels_by_name() {
    let (_dir, path) = bundle(QUEST);
    qw().arg("play")
        .arg(&path)
        .write_stdin("B1\nvillage square\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("A locked gate."))
        .stdout(predicate::str::contains("== Village Square =="));
}

#[test]
fn play_unknown_command() {
    let (_dir, path) = bundle(QUEST);
    qw().arg("play")
        .arg(&path)
        .write_stdin("dance\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("unknown command"));
}

// -- demo bundle -------------------------------------------------------------

fn demo() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../demos/ember_vale.json")
}

#[test]
fn demo_loads_and_lints_without_errors() {
    qw().arg("check")
        .arg(demo())
        .assert()
        .success()
        .stdout(predicate::str::contains("Start: intro"));
    qw().arg("lint").arg(demo()).assert().success();
}

#[test]
fn demo_is_reproducible_per_seed() {
    let run = || {
        qw().args(["play", "--seed", "7"])
            .arg(demo())
            .write_stdin("1\n1\n1\nquit\n")
            .output()
            .unwrap()
            .stdout
    };
    assert_eq!(run(), run());
}
