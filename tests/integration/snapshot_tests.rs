use std::sync::Arc;

use codescope::core::errors::SnapshotError;
use codescope::core::pipeline::{AnalysisPipeline, NoProgress};
use codescope::export::{self, read_snapshot, write_snapshot};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use crate::common::fixtures::{repo_id, ten_file_repository};

#[tokio::test]
async fn snapshot_file_round_trips_byte_for_byte() {
    let result = AnalysisPipeline::new(Arc::new(ten_file_repository()))
        .analyze(&repo_id(), &NoProgress)
        .await
        .unwrap();

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("analysis.json");
    write_snapshot(&path, &result).await.unwrap();
    let written = std::fs::read_to_string(&path).unwrap();

    let imported = read_snapshot(&path).await.unwrap();
    assert_eq!(imported, result);
    assert_eq!(export::to_json(&imported).unwrap(), written);
}

#[tokio::test]
async fn snapshot_missing_security_issues_is_rejected() {
    let result = AnalysisPipeline::new(Arc::new(ten_file_repository()))
        .analyze(&repo_id(), &NoProgress)
        .await
        .unwrap();
    let mut value = serde_json::to_value(&result).unwrap();
    value.as_object_mut().unwrap().remove("securityIssues");

    let err = export::from_json(&value.to_string()).unwrap_err();
    match err {
        SnapshotError::MissingKey { key } => assert_eq!(key, "securityIssues"),
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn unreadable_snapshot_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = read_snapshot(&dir.path().join("missing.json")).await.unwrap_err();
    assert!(matches!(err, SnapshotError::Io { .. }));
}

#[test]
fn metadata_only_files_keep_their_shape() {
    let json = r#"{
  "files": [
    {
      "path": "README.md",
      "name": "README.md",
      "folder": "root",
      "size": 12,
      "isCode": false
    }
  ],
  "connections": [],
  "stats": {
    "files": 1,
    "codeFiles": 0,
    "functions": 0,
    "dead": 0,
    "connections": 0,
    "avgComplexity": 0,
    "totalLines": 0
  },
  "patterns": [],
  "securityIssues": []
}"#;
    let imported = export::from_json(json).unwrap();
    assert_eq!(export::to_json(&imported).unwrap(), json);
}
