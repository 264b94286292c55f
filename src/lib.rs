//! # codescope
//!
//! Static analysis of source repositories: per-file symbol extraction, a cross-file
//! call and import graph, dead-code detection, pattern classification, and
//! blast-radius and health scores.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use codescope::core::{AnalysisPipeline, LocalRepositoryClient, NoProgress};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = LocalRepositoryClient::new(".");
//!     let repo = client.repository_id();
//!     let result = AnalysisPipeline::new(Arc::new(client))
//!         .analyze(&repo, &NoProgress)
//!         .await?;
//!     println!("{} dead functions", result.stats.dead);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Overview
//!
//! - [`core`] - Parsing, graph building, metrics and the analysis pipeline
//! - [`config`] - TOML configuration with environment overrides
//! - [`export`] - Snapshot export/import and CSV reports
//! - [`cli`] - Command-line interface

/// Command-line interface and argument parsing
pub mod cli;
/// Configuration loading and validation
pub mod config;
/// Parsing, graph building, metrics and the analysis pipeline
pub mod core;
/// Snapshot export/import and CSV reports
pub mod export;

pub use crate::cli::{run_cli, Cli};
pub use crate::config::CodeScopeConfig;
pub use crate::core::{
    AnalysisPipeline, AnalysisResult, BlastRadius, BlastRadiusCalculator, CodeScopeError,
    CodeScopeResult, HealthScore, RepositoryClient, RepositoryId, SourceParser,
};
