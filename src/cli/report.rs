//! Human-readable terminal output.

use std::fmt::Write as _;

use colored::Colorize;

use crate::core::blast_radius::{BlastRadius, ImpactLevel};
use crate::core::metrics::{Grade, HealthScore};
use crate::core::types::{AnalysisResult, Severity};

const TOP_DEAD: usize = 10;

fn grade_colored(grade: Grade) -> colored::ColoredString {
    let text = grade.to_string();
    match grade {
        Grade::A | Grade::B => text.green().bold(),
        Grade::C => text.yellow().bold(),
        Grade::D | Grade::F => text.red().bold(),
    }
}

fn severity_colored(severity: Severity) -> colored::ColoredString {
    let text = severity.to_string();
    match severity {
        Severity::High => text.red(),
        Severity::Medium => text.yellow(),
        Severity::Low => text.normal(),
    }
}

pub fn render_summary(repo: &str, result: &AnalysisResult) -> String {
    let stats = &result.stats;
    let health = HealthScore::from_result(result);
    let mut out = String::new();

    let _ = writeln!(out, "{} {}", "Analysis of".bold(), repo.cyan().bold());
    let _ = writeln!(out, "  files         {} ({} code)", stats.files, stats.code_files);
    let _ = writeln!(out, "  lines         {}", stats.total_lines);
    let _ = writeln!(out, "  functions     {} ({} dead)", stats.functions, stats.dead);
    let _ = writeln!(out, "  connections   {}", stats.connections);
    let _ = writeln!(out, "  complexity    {} avg", stats.avg_complexity);
    let _ = writeln!(
        out,
        "  health        {}/100 grade {}",
        health.score,
        grade_colored(health.grade)
    );

    if !result.patterns.is_empty() {
        let _ = writeln!(out, "\n{}", "Patterns".bold());
        for pattern in &result.patterns {
            let _ = writeln!(
                out,
                "  {} {:<10} {} files",
                pattern.icon,
                pattern.name.to_string(),
                pattern.files.len()
            );
        }
    }

    let dead: Vec<_> = result.dead_functions().collect();
    if !dead.is_empty() {
        let _ = writeln!(out, "\n{}", "Dead code".bold());
        for function in dead.iter().take(TOP_DEAD) {
            let _ = writeln!(
                out,
                "  {}:{} {}",
                function.file,
                function.line,
                function.name.dimmed()
            );
        }
        if dead.len() > TOP_DEAD {
            let _ = writeln!(out, "  ... and {} more", dead.len() - TOP_DEAD);
        }
    }

    if !result.security_issues.is_empty() {
        let _ = writeln!(out, "\n{}", "Security".bold());
        for issue in &result.security_issues {
            let _ = writeln!(
                out,
                "  [{}] {} {}:{}",
                severity_colored(issue.severity),
                issue.title,
                issue.file,
                issue.line
            );
        }
    }

    out
}

pub fn render_blast(radius: &BlastRadius) -> String {
    let level = radius.level.to_string();
    let level = match radius.level {
        ImpactLevel::Critical | ImpactLevel::High => level.red().bold(),
        ImpactLevel::Medium => level.yellow(),
        ImpactLevel::Low => level.green(),
    };

    let mut out = String::new();
    let _ = writeln!(out, "{} {}", "Blast radius of".bold(), radius.file.cyan());
    let _ = writeln!(out, "  impact        {level} ({}%)", radius.percent);
    let _ = writeln!(out, "  direct        {}", radius.count);
    let _ = writeln!(out, "  transitive    {} (depth {})", radius.transitive_count, radius.depth);
    let _ = writeln!(out, "  functions     {} used, {} calls", radius.fns_used, radius.total_calls);
    let _ = writeln!(out, "  dependencies  {}", radius.dependencies.len());

    for reached in &radius.transitive {
        let _ = writeln!(out, "    {} {}", reached.depth, reached.file);
    }
    out
}

pub fn render_health(health: &HealthScore, result: &AnalysisResult) -> String {
    format!(
        "{}/100 grade {} ({} files, {} dead of {} functions, {} security issues)\n",
        health.score,
        grade_colored(health.grade),
        result.stats.files,
        result.stats.dead,
        result.stats.functions,
        result.security_issues.len()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::blast_radius::blast_radius;
    use crate::core::types::{AnalysisStats, Connection, FileRecord};

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_summary_lists_stats_and_grade() {
        plain();
        let result = AnalysisResult {
            files: vec![FileRecord::from_path("a.ts", 1, true)],
            stats: AnalysisStats {
                files: 1,
                code_files: 1,
                ..AnalysisStats::default()
            },
            ..AnalysisResult::default()
        };
        let text = render_summary("acme/demo", &result);
        assert!(text.starts_with("Analysis of acme/demo\n"));
        assert!(text.contains("files         1 (1 code)"));
        assert!(text.contains("health        100/100 grade A"));
        assert!(!text.contains("Dead code"));
    }

    #[test]
    fn test_blast_lists_reached_files() {
        plain();
        let connections = vec![Connection {
            source: "a.ts".into(),
            target: "b.ts".into(),
            function: "f".into(),
            count: 2,
            lines: vec![1, 2],
        }];
        let files = vec![
            FileRecord::from_path("a.ts", 1, true),
            FileRecord::from_path("b.ts", 1, true),
        ];
        let text = render_blast(&blast_radius("a.ts", &connections, &files));
        assert!(text.contains("direct        1"));
        assert!(text.contains("    1 b.ts"));
    }
}
