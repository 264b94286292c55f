use std::sync::{Arc, Mutex};

use codescope::core::errors::{CodeScopeError, RepositoryError};
use codescope::core::pipeline::{AnalysisPipeline, NoProgress, PipelineOptions, ProgressPhase};
use codescope::core::repository::RepositoryClient;
use codescope::core::types::{FileRecord, Severity};
use pretty_assertions::assert_eq;

use crate::common::fixtures::{
    malformed_file_repository, nine_file_repository, repo_id, ten_file_repository, BROKEN_FILE,
};
use crate::common::MockRepository;

#[tokio::test]
async fn one_unreadable_file_does_not_sink_the_batch() {
    let pipeline = AnalysisPipeline::new(Arc::new(ten_file_repository()));
    let result = pipeline.analyze(&repo_id(), &NoProgress).await.unwrap();

    assert_eq!(result.stats.files, 10);
    let broken = result.file(BROKEN_FILE).unwrap();
    assert!(!broken.is_analyzed());
    assert!(broken.functions.is_none());
    assert!(broken.complexity.is_none());

    let reference = AnalysisPipeline::new(Arc::new(nine_file_repository()))
        .analyze(&repo_id(), &NoProgress)
        .await
        .unwrap();
    let healthy: Vec<&FileRecord> = result
        .files
        .iter()
        .filter(|f| f.path != BROKEN_FILE)
        .collect();
    let expected: Vec<&FileRecord> = reference.files.iter().collect();
    assert_eq!(healthy, expected);
    assert_eq!(result.connections, reference.connections);
    assert_eq!(result.stats.functions, 9);
}

#[tokio::test]
async fn one_malformed_file_does_not_disturb_the_rest() {
    let result = AnalysisPipeline::new(Arc::new(malformed_file_repository()))
        .analyze(&repo_id(), &NoProgress)
        .await
        .unwrap();

    assert_eq!(result.stats.files, 10);
    let broken = result.file(BROKEN_FILE).unwrap();
    assert_eq!(broken.function_count(), 0);
    assert!(result
        .connections
        .iter()
        .all(|c| c.source != BROKEN_FILE && c.target != BROKEN_FILE));

    let reference = AnalysisPipeline::new(Arc::new(nine_file_repository()))
        .analyze(&repo_id(), &NoProgress)
        .await
        .unwrap();
    let healthy: Vec<&FileRecord> = result
        .files
        .iter()
        .filter(|f| f.path != BROKEN_FILE)
        .collect();
    let expected: Vec<&FileRecord> = reference.files.iter().collect();
    assert_eq!(healthy, expected);
    assert_eq!(result.connections, reference.connections);
    assert_eq!(result.stats.functions, reference.stats.functions);
    assert_eq!(result.stats.functions, 9);
    assert_eq!(result.stats.dead, 0);
}

#[tokio::test]
async fn rate_limit_on_listing_is_distinguishable() {
    let mut client = MockRepository::new();
    client
        .expect_list_files()
        .times(1)
        .returning(|_| Err(RepositoryError::RateLimited { reset: 1_700_000_000 }));
    client.expect_get_file_content().never();

    let err = AnalysisPipeline::new(Arc::new(client))
        .analyze(&repo_id(), &NoProgress)
        .await
        .unwrap_err();

    assert!(err.is_rate_limited());
    assert!(matches!(
        err,
        CodeScopeError::Repository(RepositoryError::RateLimited { reset: 1_700_000_000 })
    ));
}

#[tokio::test]
async fn not_found_is_a_plain_failure() {
    let mut client = MockRepository::new();
    client.expect_list_files().returning(|_| {
        Err(RepositoryError::NotFound {
            resource: "repos/acme/demo".into(),
        })
    });

    let err = AnalysisPipeline::new(Arc::new(client))
        .analyze(&repo_id(), &NoProgress)
        .await
        .unwrap_err();
    assert!(!err.is_rate_limited());
}

#[tokio::test]
async fn only_small_code_files_are_fetched() {
    let mut client = MockRepository::new();
    client.expect_list_files().returning(|_| {
        Ok(vec![
            FileRecord::from_path("src/app.ts", 120, true),
            FileRecord::from_path("src/generated.ts", 250_000, true),
            FileRecord::from_path("README.md", 80, false),
        ])
    });
    client
        .expect_get_file_content()
        .withf(|repo, path| repo.owner == "acme" && path == "src/app.ts")
        .times(1)
        .returning(|_, _| Some("export const token = \"sk_live_abcdef1234567890\";\n".into()));

    let result = AnalysisPipeline::with_options(Arc::new(client), PipelineOptions::default())
        .analyze(&repo_id(), &NoProgress)
        .await
        .unwrap();

    assert!(result.file("src/app.ts").unwrap().is_analyzed());
    assert!(!result.file("src/generated.ts").unwrap().is_analyzed());
    assert!(!result.file("README.md").unwrap().is_analyzed());
    assert_eq!(result.security_issues.len(), 1);
    assert_eq!(result.security_issues[0].severity, Severity::High);
    assert_eq!(result.security_issues[0].line, 1);
}

#[tokio::test]
async fn missing_content_keeps_metadata() {
    let mut client = MockRepository::new();
    client
        .expect_list_files()
        .returning(|_| Ok(vec![FileRecord::from_path("lib/a.py", 10, true)]));
    client.expect_get_file_content().returning(|_, _| None);

    let result = AnalysisPipeline::new(Arc::new(client))
        .analyze(&repo_id(), &NoProgress)
        .await
        .unwrap();
    assert_eq!(result.stats.files, 1);
    assert_eq!(result.stats.total_lines, 0);
    assert!(result.connections.is_empty());
}

#[tokio::test]
async fn every_selected_file_reports_progress() {
    let files = Mutex::new(Vec::new());
    let reporter = |phase: ProgressPhase, file: Option<&str>| {
        if let (ProgressPhase::Parsing, Some(file)) = (phase, file) {
            files.lock().unwrap().push(file.to_string());
        }
    };

    let client: Arc<dyn RepositoryClient> = Arc::new(ten_file_repository());
    let options = PipelineOptions {
        max_concurrent_fetches: 3,
        ..PipelineOptions::default()
    };
    AnalysisPipeline::with_options(client, options)
        .analyze(&repo_id(), &reporter)
        .await
        .unwrap();

    let mut seen = files.into_inner().unwrap();
    seen.sort();
    assert_eq!(seen.len(), 10);
    assert_eq!(seen[0], BROKEN_FILE);
}
