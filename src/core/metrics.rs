use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::core::types::{
    AnalysisResult, AnalysisStats, Connection, FileRecord, Pattern, PatternFile, PatternKind,
    PatternSeverity, Severity,
};

/// Mark top-level functions with no recorded calls as dead. Returns how many.
///
/// Nested functions are never marked; their liveness follows the enclosing scope.
pub fn mark_dead_code(files: &mut [FileRecord]) -> usize {
    let mut dead = 0;
    for function in files
        .iter_mut()
        .filter_map(|f| f.functions.as_mut())
        .flatten()
    {
        function.is_dead = function.is_top_level && function.total_calls == 0;
        if function.is_dead {
            dead += 1;
        }
    }
    dead
}

fn has_dir(path: &str, dir: &str) -> bool {
    path.starts_with(&format!("{dir}/")) || path.contains(&format!("/{dir}/"))
}

fn matches_pattern(kind: PatternKind, file: &FileRecord, content: &str) -> bool {
    match kind {
        PatternKind::Singleton => {
            content.contains("static getinstance") || content.contains("static instance")
        }
        PatternKind::Factory => content.contains("createinstance") || content.contains("factory."),
        PatternKind::Observer => content.contains("subscribe(") || content.contains("notify("),
        PatternKind::Provider => {
            content.contains("provider")
                && (content.contains("context") || content.contains("state"))
        }
        PatternKind::Hook => {
            file.name.starts_with("use")
                && (has_dir(&file.path, "hooks") || file.path.contains("/use-"))
        }
        PatternKind::Component => {
            let exported = has_dir(&file.path, "components")
                || content.contains("export function")
                || content.contains("export const");
            exported && (content.contains("return (") || content.contains("return <"))
        }
    }
}

/// Bucket analyzed files into the six structural patterns. Empty buckets are dropped.
pub fn detect_patterns(files: &[FileRecord]) -> Vec<Pattern> {
    let mut buckets: Vec<(PatternKind, Vec<PatternFile>)> =
        PatternKind::ALL.iter().map(|k| (*k, Vec::new())).collect();

    for file in files {
        let Some(content) = &file.content else {
            continue;
        };
        let lowered = content.to_lowercase();
        for (kind, matched) in buckets.iter_mut() {
            if matches_pattern(*kind, file, &lowered) {
                matched.push(PatternFile {
                    name: file.name.clone(),
                    path: file.path.clone(),
                    fns: file.function_count(),
                    lines: line_count(content),
                });
            }
        }
    }

    buckets
        .into_iter()
        .filter(|(_, matched)| !matched.is_empty())
        .map(|(kind, matched)| Pattern {
            name: kind,
            icon: kind.icon().to_string(),
            desc: format!("Detected {} instances of the {} pattern.", matched.len(), kind),
            severity: PatternSeverity::Info,
            files: matched,
        })
        .collect()
}

pub fn line_count(content: &str) -> usize {
    content.split('\n').count()
}

pub fn compute_stats(files: &[FileRecord], connections: &[Connection]) -> AnalysisStats {
    let code_files = files.iter().filter(|f| f.is_code).count();
    let functions: Vec<_> = files
        .iter()
        .filter_map(|f| f.functions.as_ref())
        .flatten()
        .collect();
    let complexity_sum: u64 = files
        .iter()
        .filter_map(|f| f.complexity)
        .map(|c| c.score as u64)
        .sum();

    let stats = AnalysisStats {
        files: files.len(),
        code_files,
        functions: functions.len(),
        dead: functions.iter().filter(|f| f.is_dead).count(),
        connections: connections.len(),
        avg_complexity: (complexity_sum as f64 / code_files.max(1) as f64).round() as u32,
        total_lines: files
            .iter()
            .filter_map(|f| f.content.as_deref())
            .map(line_count)
            .sum(),
    };
    debug!(?stats, "computed stats");
    stats
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        };
        f.write_str(letter)
    }
}

/// Repository-wide 0..=100 summary score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthScore {
    pub score: u32,
    pub grade: Grade,
}

impl HealthScore {
    pub fn from_result(result: &AnalysisResult) -> Self {
        let stats = &result.stats;
        let mut score = 100.0_f64;

        let dead_pct = if stats.functions > 0 {
            stats.dead as f64 / stats.functions as f64 * 100.0
        } else {
            0.0
        };
        score -= dead_pct.min(20.0);

        let coupling = if stats.files > 0 {
            stats.connections as f64 / stats.files as f64
        } else {
            0.0
        };
        score -= ((coupling - 3.0).max(0.0) * 2.0).min(15.0);

        let high = result
            .security_issues
            .iter()
            .filter(|i| i.severity == Severity::High)
            .count();
        score -= (high as f64 * 5.0).min(20.0);

        let score = score.round().max(0.0) as u32;
        let grade = match score {
            90.. => Grade::A,
            80..=89 => Grade::B,
            70..=79 => Grade::C,
            60..=69 => Grade::D,
            _ => Grade::F,
        };
        Self { score, grade }
    }
}
