pub mod blast_radius;
pub mod call_resolver;
pub mod constants;
pub mod errors;
pub mod graph;
pub mod metrics;
pub mod parser;
pub mod pipeline;
pub mod repository;
pub mod types;

pub use blast_radius::{
    blast_radius, blast_radius_all, BlastRadius, BlastRadiusCalculator, ImpactLevel, ReachedFile,
};
pub use call_resolver::{find_calls, CallInfo, CallMap};
pub use errors::{
    CodeScopeError, CodeScopeResult, ConfigError, ParseError, RepositoryError, SnapshotError,
};
pub use graph::{GraphBuilder, ResolutionContext, SymbolTable};
pub use metrics::{compute_stats, detect_patterns, mark_dead_code, Grade, HealthScore};
pub use parser::{ComplexityThresholds, Language, ParsedFile, SourceParser};
pub use pipeline::{AnalysisPipeline, NoProgress, PipelineOptions, ProgressPhase, ProgressReporter};
pub use repository::{
    CommitAuthor, FileFilter, InMemoryRepositoryClient, LocalRepositoryClient, RateLimitStatus,
    RepositoryClient, RepositoryId,
};
#[cfg(feature = "network")]
pub use repository::{github::GitHubConfig, GitHubClient};
pub use types::*;
