//! Runs the `gltf-check` binary and inspects its exit status and output.

use std::path::Path;
use std::process::Output;

use tempfile::tempdir;

const VALID: &str = r#"{"asset":{"version":"2.0"},"nodes":[{}]}"#;
const DANGLING: &str = r#"{"asset":{"version":"2.0"},"nodes":[{"mesh":4}]}"#;

// Helper to run gltf-check with extra arguments
fn gltf_check(file: &Path, args: &[&str]) -> Output {
    std::process::Command::new(env!("CARGO_BIN_EXE_gltf-check"))
        .arg(file)
        .args(args)
        .output()
        .expect("Failed to run gltf-check")
}

#[test]
fn test_exit_status_valid() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("valid.gltf");
    std::fs::write(&path, VALID).unwrap();

    let output = gltf_check(&path, &[]);
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.trim_end().ends_with(": valid"));
}

#[test]
fn test_exit_status_invalid() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dangling.gltf");
    std::fs::write(&path, DANGLING).unwrap();

    let output = gltf_check(&path, &[]);
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("[references] DanglingReference nodes[0]"));
}

#[test]
fn test_exit_status_unreadable() {
    let dir = tempdir().unwrap();
    let output = gltf_check(&dir.path().join("absent.gltf"), &[]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Failed to read"));
}

#[test]
fn test_json_format() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dangling.gltf");
    std::fs::write(&path, DANGLING).unwrap();

    let output = gltf_check(&path, &["--format", "json"]);
    assert_eq!(output.status.code(), Some(1));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["valid"], false);
    assert_eq!(report["failedStage"], "references");
    assert_eq!(report["entries"][0]["entityIndex"], 0);
}

#[test]
fn test_canonical_output() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("valid.gltf");
    std::fs::write(&path, r#"{ "asset": { "version": "2.0" }, "nodes": [ {"scale": [1,1,1]} ] }"#)
        .unwrap();

    let output = gltf_check(&path, &["--canonical"]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        String::from_utf8(output.stdout).unwrap(),
        "{\"asset\":{\"version\":\"2.0\"},\"nodes\":[{}]}\n"
    );
}

#[test]
fn test_canonical_falls_back_to_report_when_invalid() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dangling.gltf");
    std::fs::write(&path, DANGLING).unwrap();

    let output = gltf_check(&path, &["--canonical"]);
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("invalid (1 error(s) in references stage)"));
}

#[test]
fn test_max_size_flag() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("valid.gltf");
    std::fs::write(&path, VALID).unwrap();

    let output = gltf_check(&path, &["--max-size", "8"]);
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("exceeds the limit of 8 bytes"));
}
