//! Integration tests for `taxograph check`.
#![allow(clippy::expect_used)]

use std::io::Write;
use std::path::PathBuf;
use std::process::Command;

use tempfile::NamedTempFile;

/// Path to the compiled `taxograph` binary.
fn taxograph_bin() -> PathBuf {
    let mut path = std::env::current_exe().expect("current exe");
    path.pop();
    if path.ends_with("deps") {
        path.pop();
    }
    path.push("taxograph");
    path
}

/// Writes `content` to a temp edge-list file.
fn edge_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(content.as_bytes()).expect("write edges");
    file
}

#[test]
fn check_clean_tree_exits_0_with_summary() {
    let file = edge_file("# diamond\n1 2\n1 3\n2 4\n3 4\n");
    let out = Command::new(taxograph_bin())
        .args(["check", file.path().to_str().expect("path")])
        .output()
        .expect("run taxograph check");

    assert!(out.status.success(), "exit code: {:?}", out.status.code());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("nodes: 4"), "stdout: {stdout}");
    assert!(stdout.contains("edges: 4"), "stdout: {stdout}");
    assert!(stdout.contains("roots: 1"), "stdout: {stdout}");
    assert!(stdout.contains("cycles: 0"), "stdout: {stdout}");
}

#[test]
fn check_cycle_exits_1() {
    let file = edge_file("1 10\n10 20\n20 30\n30 10\n");
    let out = Command::new(taxograph_bin())
        .args(["check", file.path().to_str().expect("path")])
        .output()
        .expect("run taxograph check");

    assert_eq!(out.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("cycles: 1"), "stdout: {stdout}");
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("cycle(s) remain"), "stderr: {stderr}");
}

#[test]
fn check_forest_warns_about_roots_but_exits_0() {
    let file = edge_file("1 2\n5 6\n");
    let out = Command::new(taxograph_bin())
        .args(["check", file.path().to_str().expect("path")])
        .output()
        .expect("run taxograph check");

    assert!(out.status.success(), "exit code: {:?}", out.status.code());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("found 2"), "stderr: {stderr}");
}

#[test]
fn check_json_reports_structured_fields() {
    let file = edge_file("1 2\n2 3\n3 1\n");
    let out = Command::new(taxograph_bin())
        .args(["check", file.path().to_str().expect("path"), "--format", "json"])
        .output()
        .expect("run taxograph check");

    let value: serde_json::Value =
        serde_json::from_slice(&out.stdout).expect("stdout is one JSON object");
    assert_eq!(value["nodes"], 3);
    assert_eq!(value["edges"], 3);
    assert_eq!(value["roots"].as_array().expect("roots array").len(), 0);
    assert_eq!(value["cycles"][0], serde_json::json!([1, 2, 3]));
    assert!(
        !value["alerts"].as_array().expect("alerts array").is_empty(),
        "root anomaly and cycle alerts expected"
    );
}

#[test]
fn check_missing_file_exits_2() {
    let out = Command::new(taxograph_bin())
        .args(["check", "/nonexistent/taxonomy.edges"])
        .output()
        .expect("run taxograph check");

    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("not found"), "stderr: {stderr}");
}

#[test]
fn check_malformed_line_exits_2_with_line_number() {
    let file = edge_file("1 2\nnot numbers\n");
    let out = Command::new(taxograph_bin())
        .args(["check", file.path().to_str().expect("path")])
        .output()
        .expect("run taxograph check");

    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("line 2"), "stderr: {stderr}");
}
