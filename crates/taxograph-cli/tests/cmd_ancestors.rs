//! Integration tests for `taxograph ancestors`.
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
fn ancestors_of_deep_node_lists_full_closure() {
    // 1 → {2, 3} → 4, plus a sibling branch 3 → 5 that must not appear.
    let file = edge_file("1 2\n1 3\n2 4\n3 4\n3 5\n");
    let out = Command::new(taxograph_bin())
        .args(["ancestors", file.path().to_str().expect("path"), "4"])
        .output()
        .expect("run taxograph ancestors");

    assert!(out.status.success(), "exit code: {:?}", out.status.code());
    let stdout = String::from_utf8_lossy(&out.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines, vec!["1", "2", "3"], "stdout: {stdout}");
}

#[test]
fn ancestors_of_root_is_empty() {
    let file = edge_file("1 2\n2 3\n");
    let out = Command::new(taxograph_bin())
        .args(["ancestors", file.path().to_str().expect("path"), "1"])
        .output()
        .expect("run taxograph ancestors");

    assert!(out.status.success(), "exit code: {:?}", out.status.code());
    assert!(out.stdout.is_empty(), "root has no ancestors");
}

#[test]
fn ancestors_json_reports_count() {
    let file = edge_file("1 2\n2 3\n");
    let out = Command::new(taxograph_bin())
        .args([
            "ancestors",
            file.path().to_str().expect("path"),
            "3",
            "--format",
            "json",
        ])
        .output()
        .expect("run taxograph ancestors");

    let value: serde_json::Value =
        serde_json::from_slice(&out.stdout).expect("stdout is one JSON object");
    assert_eq!(value["node"], 3);
    assert_eq!(value["ancestors"], serde_json::json!([1, 2]));
    assert_eq!(value["count"], 2);
}

#[test]
fn ancestors_of_unknown_node_exits_1() {
    let file = edge_file("1 2\n");
    let out = Command::new(taxograph_bin())
        .args(["ancestors", file.path().to_str().expect("path"), "99"])
        .output()
        .expect("run taxograph ancestors");

    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("99"), "stderr: {stderr}");
}

#[test]
fn ancestors_accepts_negative_nids() {
    let file = edge_file("-5 1\n1 2\n");
    let out = Command::new(taxograph_bin())
        .args(["ancestors", file.path().to_str().expect("path"), "2"])
        .output()
        .expect("run taxograph ancestors");

    assert!(out.status.success(), "exit code: {:?}", out.status.code());
    let stdout = String::from_utf8_lossy(&out.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines, vec!["-5", "1"], "stdout: {stdout}");
}
