//! E2E tests for `trellis snapshot generate` and `trellis snapshot verify`.
//!
//! Covers: artifact layout on disk, byte-stable regeneration, verify exit
//! codes for in-sync / diverged / missing artifacts, and edge typing.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test harness helpers
// ---------------------------------------------------------------------------

fn trellis_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("trellis"));
    cmd.current_dir(dir);
    cmd.env("TRELLIS_LOG", "error");
    cmd.env("XDG_CONFIG_HOME", dir.join(".user-config"));
    cmd.env_remove("FORMAT");
    cmd
}

fn write_doc(root: &Path, rel: &str, text: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

fn three_docs(dir: &Path) {
    write_doc(dir, "docs/A.md", "See [[B]] and [[C|the third]].");
    write_doc(dir, "docs/B.md", "Back to [[A]].");
    write_doc(dir, "docs/C.md", "Points at [[Nowhere]].");
}

fn generate(dir: &Path) {
    trellis_cmd(dir)
        .args(["snapshot", "generate"])
        .assert()
        .success();
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn verify_json(dir: &Path) -> (bool, Value) {
    let output = trellis_cmd(dir)
        .args(["snapshot", "verify", "--format", "json"])
        .output()
        .expect("verify should not crash");
    let value = serde_json::from_slice(&output.stdout).expect("verify must print JSON");
    (output.status.success(), value)
}

// ---------------------------------------------------------------------------
// generate
// ---------------------------------------------------------------------------

#[test]
fn generate_writes_default_artifact() {
    let dir = TempDir::new().unwrap();
    three_docs(dir.path());

    let output = trellis_cmd(dir.path())
        .args(["snapshot", "generate", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let summary: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["node_count"], 3);
    assert_eq!(summary["edge_count"], 3);
    assert_eq!(summary["semantic"], 3);

    let artifact = read_json(&dir.path().join("graph.snapshot.json"));
    assert_eq!(artifact["contract_version"], "1.1");
    assert_eq!(artifact["node_count"], 3);
    assert_eq!(artifact["edge_count"], 3);
    assert_eq!(artifact["nodes"][0], serde_json::json!({"slug": "A", "title": "A"}));

    let edge = &artifact["edges"][0];
    assert_eq!(edge["source"], "A");
    assert_eq!(edge["target"], "B");
    assert_eq!(edge["type"], "semantic");
    assert_eq!(edge["weight"], 1.0);
    assert!(edge["importance"].is_null());
    assert_eq!(edge["defaultVisible"], true);
}

#[test]
fn generate_out_creates_parent_directories() {
    let dir = TempDir::new().unwrap();
    three_docs(dir.path());

    trellis_cmd(dir.path())
        .args(["snapshot", "generate", "--out", "build/contract/graph.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("OK   "));
    assert!(dir.path().join("build/contract/graph.json").is_file());
}

#[test]
fn map_document_edges_are_structural() {
    let dir = TempDir::new().unwrap();
    write_doc(dir.path(), "docs/КАРТА_СИСТЕМИ.md", "[[Ядро]]");
    write_doc(dir.path(), "docs/Ядро.md", "[[Модуль]]");
    write_doc(dir.path(), "docs/Модуль.md", "[[Ядро]]");
    generate(dir.path());

    let artifact = read_json(&dir.path().join("graph.snapshot.json"));
    // Slugs are percent-encoded; find the map node by its title.
    let map_slug = artifact["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .find(|n| n["title"] == "КАРТА_СИСТЕМИ")
        .expect("map node")["slug"]
        .clone();
    for edge in artifact["edges"].as_array().unwrap() {
        let touches_map = edge["source"] == map_slug || edge["target"] == map_slug;
        let expected = if touches_map { "structural" } else { "semantic" };
        assert_eq!(edge["type"], expected, "{edge}");
        assert_eq!(edge["defaultVisible"], !touches_map);
    }
}

#[test]
fn regenerating_unchanged_corpus_changes_only_the_stamp() {
    let dir = TempDir::new().unwrap();
    three_docs(dir.path());

    generate(dir.path());
    let mut first = read_json(&dir.path().join("graph.snapshot.json"));
    generate(dir.path());
    let mut second = read_json(&dir.path().join("graph.snapshot.json"));

    first["generated"] = Value::Null;
    second["generated"] = Value::Null;
    assert_eq!(first, second);
}

// ---------------------------------------------------------------------------
// verify
// ---------------------------------------------------------------------------

#[test]
fn verify_after_generate_is_ok() {
    let dir = TempDir::new().unwrap();
    three_docs(dir.path());
    generate(dir.path());

    let (ok, report) = verify_json(dir.path());
    assert!(ok);
    assert_eq!(report["status"], "OK");
    assert_eq!(report["divergence_count"], 0);
    assert_eq!(report["version_match"], true);
    assert_eq!(report["python_node_count"], 3);
    assert_eq!(report["snapshot_edge_count"], 3);
}

#[test]
fn verify_text_output_in_sync() {
    let dir = TempDir::new().unwrap();
    three_docs(dir.path());
    generate(dir.path());

    trellis_cmd(dir.path())
        .args(["snapshot", "verify"])
        .assert()
        .success()
        .stdout(predicate::str::contains("verify: in sync"));
}

#[test]
fn verify_detects_drift_and_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    three_docs(dir.path());
    generate(dir.path());

    // C disappears, D appears and links to A.
    fs::remove_file(dir.path().join("docs/C.md")).unwrap();
    write_doc(dir.path(), "docs/D.md", "Up to [[A]].");

    let (ok, report) = verify_json(dir.path());
    assert!(!ok);
    assert_eq!(report["status"], "DIVERGED");
    assert_eq!(report["stale_nodes"], serde_json::json!(["C"]));
    assert_eq!(report["missing_nodes"], serde_json::json!(["D"]));
    assert_eq!(report["stale_edges"], serde_json::json!(["A→C"]));
    assert_eq!(report["missing_edges"], serde_json::json!(["D→A"]));
    assert_eq!(report["divergence_count"], 4);
}

#[test]
fn verify_missing_artifact_reports_not_found() {
    let dir = TempDir::new().unwrap();
    three_docs(dir.path());

    let (ok, report) = verify_json(dir.path());
    assert!(!ok);
    assert_eq!(report["status"], "NOT_FOUND");
    assert_eq!(report["error_code"], "E3001");
    assert!(
        report["snapshot_path"]
            .as_str()
            .unwrap()
            .ends_with("graph.snapshot.json")
    );
    assert!(
        report["hint"]
            .as_str()
            .unwrap()
            .contains("trellis snapshot generate")
    );
}

#[test]
fn verify_missing_artifact_text_shows_hint() {
    let dir = TempDir::new().unwrap();
    three_docs(dir.path());

    trellis_cmd(dir.path())
        .args(["snapshot", "verify", "--snapshot", "elsewhere.json"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("elsewhere.json"))
        .stdout(predicate::str::contains("hint:"));
}

#[test]
fn verify_corrupt_artifact_is_an_error() {
    let dir = TempDir::new().unwrap();
    three_docs(dir.path());
    fs::write(dir.path().join("graph.snapshot.json"), "{ not json").unwrap();

    trellis_cmd(dir.path())
        .args(["snapshot", "verify"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E3002"));
}
