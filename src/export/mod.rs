//! Snapshot export and import.
//!
//! A snapshot is the pretty-printed JSON form of an [`AnalysisResult`]. Importing
//! checks the top-level shape first so that a truncated or foreign file is rejected
//! as a whole, and exporting an imported snapshot reproduces it byte for byte.

use std::fmt::Write as _;
use std::path::Path;

use chrono::NaiveDate;
use serde_json::Value;
use tracing::debug;

use crate::core::errors::SnapshotError;
use crate::core::types::AnalysisResult;

/// Keys every snapshot must carry at its root.
pub const REQUIRED_KEYS: [&str; 5] = [
    "files",
    "connections",
    "stats",
    "patterns",
    "securityIssues",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    /// Full JSON snapshot.
    Analysis,
    /// Per-file CSV report.
    Report,
    /// Edge list CSV.
    Connections,
}

impl ExportKind {
    fn stem_and_extension(&self) -> (&'static str, &'static str) {
        match self {
            Self::Analysis => ("analysis", "json"),
            Self::Report => ("report", "csv"),
            Self::Connections => ("connections", "csv"),
        }
    }
}

/// `codescope-<kind>-YYYY-MM-DD.<ext>`
pub fn default_file_name(kind: ExportKind, date: NaiveDate) -> String {
    let (stem, ext) = kind.stem_and_extension();
    format!("codescope-{stem}-{}.{ext}", date.format("%Y-%m-%d"))
}

pub fn to_json(result: &AnalysisResult) -> Result<String, SnapshotError> {
    Ok(serde_json::to_string_pretty(result)?)
}

pub fn from_json(text: &str) -> Result<AnalysisResult, SnapshotError> {
    let value: Value = serde_json::from_str(text)?;
    validate_shape(&value)?;
    Ok(serde_json::from_value(value)?)
}

fn validate_shape(value: &Value) -> Result<(), SnapshotError> {
    let root = value.as_object().ok_or(SnapshotError::InvalidRoot)?;
    match REQUIRED_KEYS.iter().find(|key| !root.contains_key(**key)) {
        Some(key) => Err(SnapshotError::MissingKey {
            key: key.to_string(),
        }),
        None => Ok(()),
    }
}

pub async fn read_snapshot(path: &Path) -> Result<AnalysisResult, SnapshotError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    let result = from_json(&text)?;
    debug!(path = %path.display(), files = result.files.len(), "snapshot loaded");
    Ok(result)
}

pub async fn write_snapshot(path: &Path, result: &AnalysisResult) -> Result<(), SnapshotError> {
    let text = to_json(result)?;
    tokio::fs::write(path, text)
        .await
        .map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })
}

fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// One row per file: `File,Path,Lines,Functions,Complexity`.
pub fn to_csv(result: &AnalysisResult) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "File,Path,Lines,Functions,Complexity");

    for file in &result.files {
        let _ = writeln!(
            output,
            "{},{},{},{},{}",
            csv_field(&file.name),
            csv_field(&file.path),
            file.line_count.unwrap_or(0),
            file.function_count(),
            file.complexity.map_or(0, |c| c.score)
        );
    }
    output
}

/// One row per edge: `source,target,fn,count`.
pub fn connections_to_csv(result: &AnalysisResult) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "source,target,fn,count");

    for conn in &result.connections {
        let _ = writeln!(
            output,
            "{},{},{},{}",
            csv_field(&conn.source),
            csv_field(&conn.target),
            csv_field(&conn.function),
            conn.count
        );
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Complexity, ComplexityLevel, Connection, FileRecord};
    use pretty_assertions::assert_eq;

    fn sample() -> AnalysisResult {
        let mut analyzed = FileRecord::from_path("src/a.ts", 40, true);
        analyzed.content = Some("export function a() {}\n".into());
        analyzed.line_count = Some(2);
        analyzed.functions = Some(Vec::new());
        analyzed.complexity = Some(Complexity {
            score: 3,
            level: ComplexityLevel::Low,
        });

        AnalysisResult {
            files: vec![analyzed, FileRecord::from_path("docs/a, b.md", 10, false)],
            connections: vec![Connection {
                source: "src/a.ts".into(),
                target: "src/b.ts".into(),
                function: "a".into(),
                count: 1,
                lines: vec![3],
            }],
            ..AnalysisResult::default()
        }
    }

    #[test]
    fn test_default_file_names() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(
            default_file_name(ExportKind::Analysis, date),
            "codescope-analysis-2024-03-09.json"
        );
        assert_eq!(
            default_file_name(ExportKind::Report, date),
            "codescope-report-2024-03-09.csv"
        );
    }

    #[test]
    fn test_export_import_export_is_identical() {
        let first = to_json(&sample()).unwrap();
        let imported = from_json(&first).unwrap();
        assert_eq!(imported, sample());
        assert_eq!(to_json(&imported).unwrap(), first);
    }

    #[test]
    fn test_rejects_missing_key_and_bad_root() {
        let err = from_json(r#"{"files":[],"connections":[],"stats":{},"patterns":[]}"#).unwrap_err();
        assert!(matches!(err, SnapshotError::MissingKey { ref key } if key == "securityIssues"));

        assert!(matches!(from_json("[]"), Err(SnapshotError::InvalidRoot)));
        assert!(matches!(from_json("{not json"), Err(SnapshotError::Json(_))));
    }

    #[test]
    fn test_csv_report() {
        let csv = to_csv(&sample());
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines,
            vec![
                "File,Path,Lines,Functions,Complexity",
                "a.ts,src/a.ts,2,0,3",
                "\"a, b.md\",\"docs/a, b.md\",0,0,0",
            ]
        );
    }

    #[test]
    fn test_connections_csv() {
        let csv = connections_to_csv(&sample());
        assert_eq!(csv, "source,target,fn,count\nsrc/a.ts,src/b.ts,a,1\n");
    }
}
