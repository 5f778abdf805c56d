//! Checks documents written to a temporary directory.

use std::fs;

use gltf_cli::{canonical_json, check_file, render_json, render_text, CheckConfig};
use gltf_core::{ErrorKind, Stage};
use tempfile::tempdir;

const EXTERNAL_SPARSE: &str = r#"{
    "asset": {"version": "2.0"},
    "buffers": [{"uri": "sparse.bin", "byteLength": 2}],
    "bufferViews": [{"buffer": 0, "byteLength": 2}],
    "accessors": [{
        "componentType": 5126,
        "count": 4,
        "type": "SCALAR",
        "sparse": {
            "count": 2,
            "indices": {"bufferView": 0, "componentType": 5121},
            "values": {"bufferView": 0}
        }
    }]
}"#;

const BIN_BUFFER: &str = r#"{
    "asset": {"version": "2.0"},
    "buffers": [{"byteLength": 2}],
    "bufferViews": [{"buffer": 0, "byteLength": 2}],
    "accessors": [{
        "componentType": 5126,
        "count": 4,
        "type": "SCALAR",
        "sparse": {
            "count": 2,
            "indices": {"bufferView": 0, "componentType": 5121},
            "values": {"bufferView": 0}
        }
    }]
}"#;

#[test]
fn test_valid_document_with_external_buffer() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("scene.gltf");
    fs::write(&path, EXTERNAL_SPARSE).unwrap();
    fs::write(dir.path().join("sparse.bin"), [0u8, 2]).unwrap();

    let outcome = check_file(&CheckConfig::new(&path)).unwrap();
    assert!(outcome.valid);
    assert_eq!(outcome.skipped_checks, 0);
    assert!(outcome.buffer_warnings.is_empty());
    assert!(render_text(&outcome).ends_with(": valid\n"));
}

#[test]
fn test_external_buffer_contents_are_validated() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("scene.gltf");
    fs::write(&path, EXTERNAL_SPARSE).unwrap();
    fs::write(dir.path().join("sparse.bin"), [2u8, 2]).unwrap();

    let outcome = check_file(&CheckConfig::new(&path)).unwrap();
    assert!(!outcome.valid);
    assert_eq!(outcome.failed_stage, Some(Stage::Validation));
    assert_eq!(
        outcome.entries[0].error_kind,
        ErrorKind::NonMonotonicSparseIndices
    );
}

#[test]
fn test_missing_buffer_is_a_warning() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("scene.gltf");
    fs::write(&path, EXTERNAL_SPARSE).unwrap();

    let outcome = check_file(&CheckConfig::new(&path)).unwrap();
    assert!(outcome.valid);
    assert_eq!(outcome.skipped_checks, 1);
    assert_eq!(outcome.buffer_warnings.len(), 1);

    let text = render_text(&outcome);
    assert!(text.starts_with("warning: buffer 0: Failed to fetch sparse.bin"));
    assert!(text.contains("1 check(s) skipped"));
}

#[test]
fn test_bin_payload_fills_buffer_zero() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("scene.gltf");
    let bin = dir.path().join("scene.bin");
    fs::write(&path, BIN_BUFFER).unwrap();
    fs::write(&bin, [0u8, 9]).unwrap();

    let config = CheckConfig {
        bin: Some(bin),
        ..CheckConfig::new(&path)
    };
    let outcome = check_file(&config).unwrap();
    assert!(!outcome.valid);
    assert_eq!(outcome.entries[0].error_kind, ErrorKind::SparseIndexOutOfRange);
}

#[test]
fn test_reference_errors_rendered_as_json() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.gltf");
    fs::write(&path, r#"{"asset":{"version":"2.0"},"scene":3}"#).unwrap();

    let outcome = check_file(&CheckConfig::new(&path)).unwrap();
    assert_eq!(outcome.failed_stage, Some(Stage::References));

    let json: serde_json::Value = serde_json::from_str(&render_json(&outcome).unwrap()).unwrap();
    assert_eq!(json["valid"], false);
    assert_eq!(json["failedStage"], "references");
    assert_eq!(json["entries"][0]["errorKind"], "DanglingReference");
    assert_eq!(json["entries"][0]["entityKind"], "Document");
}

#[test]
fn test_size_limit() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("scene.gltf");
    fs::write(&path, EXTERNAL_SPARSE).unwrap();

    let config = CheckConfig {
        max_size: Some(8),
        ..CheckConfig::new(&path)
    };
    let outcome = check_file(&config).unwrap();
    assert_eq!(outcome.failed_stage, Some(Stage::Parse));
}

#[test]
fn test_canonical_output_only_for_valid_documents() {
    let dir = tempdir().unwrap();
    let valid = dir.path().join("valid.gltf");
    fs::write(&valid, r#"{ "asset": { "version": "2.0" }, "nodes": [ {"scale": [1,1,1]} ] }"#)
        .unwrap();
    let outcome = check_file(&CheckConfig::new(&valid)).unwrap();
    let json = canonical_json(&outcome).unwrap().unwrap();
    assert_eq!(json, br#"{"asset":{"version":"2.0"},"nodes":[{}]}"#.to_vec());

    let invalid = dir.path().join("invalid.gltf");
    fs::write(&invalid, r#"{"asset":{"version":"2.0"},"scene":0}"#).unwrap();
    let outcome = check_file(&CheckConfig::new(&invalid)).unwrap();
    assert!(canonical_json(&outcome).unwrap().is_none());
}

#[test]
fn test_unreadable_file_is_error() {
    let dir = tempdir().unwrap();
    let err = check_file(&CheckConfig::new(dir.path().join("absent.gltf"))).unwrap_err();
    assert!(err.to_string().starts_with("Failed to read"));
}
