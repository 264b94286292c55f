//! End-to-end analysis of one repository.
//!
//! Listing failures abort the run. Everything scoped to a single file (a missing
//! body, a parse that panics) leaves that file as bare metadata and the run goes on.

use std::fmt;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::core::constants::limits::{MAX_CONCURRENT_FETCHES, MAX_FILE_SIZE};
use crate::core::errors::{CodeScopeError, CodeScopeResult};
use crate::core::graph::GraphBuilder;
use crate::core::metrics::{compute_stats, detect_patterns, line_count, mark_dead_code};
use crate::core::parser::{ComplexityThresholds, ParsedFile, SourceParser};
use crate::core::repository::{RepositoryClient, RepositoryId};
use crate::core::types::{AnalysisResult, Connection, FileRecord, SecurityIssue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressPhase {
    Scanning,
    Fetching,
    Parsing,
    Analyzing,
    Security,
    Building,
    Patterns,
    Brushing,
    Complete,
}

impl ProgressPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scanning => "scanning",
            Self::Fetching => "fetching",
            Self::Parsing => "parsing",
            Self::Analyzing => "analyzing",
            Self::Security => "security",
            Self::Building => "building",
            Self::Patterns => "patterns",
            Self::Brushing => "brushing",
            Self::Complete => "complete",
        }
    }
}

impl fmt::Display for ProgressPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Advisory progress sink. Per-file events may interleave under concurrency.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, phase: ProgressPhase, file: Option<&str>);
}

impl<F> ProgressReporter for F
where
    F: Fn(ProgressPhase, Option<&str>) + Send + Sync,
{
    fn report(&self, phase: ProgressPhase, file: Option<&str>) {
        self(phase, file)
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _phase: ProgressPhase, _file: Option<&str>) {}
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub max_concurrent_fetches: usize,
    /// Code files of this many bytes or more stay metadata-only.
    pub max_file_size: u64,
    pub thresholds: ComplexityThresholds,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: MAX_CONCURRENT_FETCHES,
            max_file_size: MAX_FILE_SIZE,
            thresholds: ComplexityThresholds::default(),
        }
    }
}

pub struct AnalysisPipeline {
    client: Arc<dyn RepositoryClient>,
    parser: Arc<SourceParser>,
    options: PipelineOptions,
}

impl AnalysisPipeline {
    pub fn new(client: Arc<dyn RepositoryClient>) -> Self {
        Self::with_options(client, PipelineOptions::default())
    }

    pub fn with_options(client: Arc<dyn RepositoryClient>, options: PipelineOptions) -> Self {
        Self {
            client,
            parser: Arc::new(SourceParser::with_thresholds(options.thresholds)),
            options,
        }
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    pub async fn analyze(
        &self,
        repo: &RepositoryId,
        progress: &dyn ProgressReporter,
    ) -> CodeScopeResult<AnalysisResult> {
        progress.report(ProgressPhase::Scanning, None);
        let mut files = self.client.list_files(repo).await?;

        let selected: Vec<usize> = files
            .iter()
            .enumerate()
            .filter(|(_, f)| f.is_code && f.size < self.options.max_file_size)
            .map(|(idx, _)| idx)
            .collect();
        info!(
            %repo,
            files = files.len(),
            selected = selected.len(),
            "repository listed"
        );

        progress.report(ProgressPhase::Fetching, None);
        let outcomes: Vec<(usize, Option<(String, ParsedFile)>)> = stream::iter(selected)
            .map(|idx| {
                let path = files[idx].path.clone();
                async move { (idx, self.analyze_file(repo, path, progress).await) }
            })
            .buffer_unordered(self.options.max_concurrent_fetches.max(1))
            .collect()
            .await;

        let mut analyzed = 0usize;
        for (idx, outcome) in outcomes {
            if let Some((content, parsed)) = outcome {
                apply_parsed(&mut files[idx], content, parsed);
                analyzed += 1;
            }
        }
        info!(analyzed, "file analysis finished");

        progress.report(ProgressPhase::Building, None);
        let (files, connections) = build_graph(files).await?;

        let stats = compute_stats(&files, &connections);

        progress.report(ProgressPhase::Patterns, None);
        let patterns = detect_patterns(&files);

        progress.report(ProgressPhase::Brushing, None);
        let security_issues = collect_security_issues(&files);

        let result = AnalysisResult {
            files,
            connections,
            stats,
            patterns,
            security_issues,
        };
        progress.report(ProgressPhase::Complete, None);
        info!(
            %repo,
            functions = result.stats.functions,
            connections = result.stats.connections,
            issues = result.security_issues.len(),
            "analysis complete"
        );
        Ok(result)
    }

    /// Fetch and parse one file. `None` leaves the record metadata-only.
    async fn analyze_file(
        &self,
        repo: &RepositoryId,
        path: String,
        progress: &dyn ProgressReporter,
    ) -> Option<(String, ParsedFile)> {
        progress.report(ProgressPhase::Parsing, Some(&path));
        let Some(content) = self.client.get_file_content(repo, &path).await else {
            debug!(path, "no content, keeping metadata only");
            return None;
        };

        progress.report(ProgressPhase::Analyzing, Some(&path));
        let parser = Arc::clone(&self.parser);
        let body = content.clone();
        let file_path = path.clone();
        let parsed = run_isolated(&path, move || parser.parse(&body, &file_path)).await?;

        progress.report(ProgressPhase::Security, Some(&path));
        Some((content, parsed))
    }
}

/// Run CPU-bound work on the blocking pool. A panic inside `work` is logged and
/// reported as `None` instead of unwinding into the caller.
pub async fn run_isolated<T, F>(path: &str, work: F) -> Option<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    match tokio::task::spawn_blocking(work).await {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(path, error = %err, "analysis of file aborted");
            None
        }
    }
}

/// Resolve the graph and mark dead code on the blocking pool.
pub async fn build_graph(
    mut files: Vec<FileRecord>,
) -> CodeScopeResult<(Vec<FileRecord>, Vec<Connection>)> {
    tokio::task::spawn_blocking(move || {
        let connections = GraphBuilder::new().build(&mut files);
        let dead = mark_dead_code(&mut files);
        debug!(dead, "dead code marked");
        (files, connections)
    })
    .await
    .map_err(|err| CodeScopeError::TaskAborted {
        stage: ProgressPhase::Building.to_string(),
        message: err.to_string(),
    })
}

fn apply_parsed(file: &mut FileRecord, content: String, parsed: ParsedFile) {
    file.line_count = Some(line_count(&content));
    file.content = Some(content);
    file.functions = Some(parsed.functions);
    file.variables = Some(parsed.variables);
    file.complexity = Some(parsed.complexity);
    file.raw_imports = Some(parsed.imports);
    file.security_issues = Some(parsed.security_issues);
}

/// All per-file findings, ordered by file then line.
fn collect_security_issues(files: &[FileRecord]) -> Vec<SecurityIssue> {
    let mut issues: Vec<SecurityIssue> = files
        .iter()
        .filter_map(|f| f.security_issues.as_ref())
        .flatten()
        .cloned()
        .collect();
    issues.sort_by(|a, b| {
        a.file
            .cmp(&b.file)
            .then(a.line.cmp(&b.line))
            .then_with(|| a.title.cmp(&b.title))
    });
    issues
}
