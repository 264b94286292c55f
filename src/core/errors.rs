/// Domain-specific error types for codescope using thiserror
///
/// Failures that prevent any result from being produced (an unlistable tree, a bad
/// repository identifier, a malformed snapshot) surface through these types. Failures
/// scoped to a single file are recovered where they happen and only logged.
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for codescope operations
#[derive(Error, Debug)]
pub enum CodeScopeError {
    #[error("Repository access failed: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Parsing failed: {0}")]
    Parse(#[from] ParseError),

    #[error("Snapshot rejected: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Background {stage} task aborted: {message}")]
    TaskAborted { stage: String, message: String },
}

impl CodeScopeError {
    /// True when the run failed because the remote API budget is exhausted.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::Repository(RepositoryError::RateLimited { .. }))
    }
}

/// Errors raised while talking to a repository backend
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Invalid repository identifier '{input}': expected owner/repo or a GitHub URL")]
    InvalidIdentifier { input: String },

    #[error("API rate limit exceeded (resets at unix time {reset}); provide a token to continue")]
    RateLimited { reset: i64 },

    #[error("Access forbidden: {message}")]
    Forbidden { message: String },

    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Network request to {url} failed: {message}")]
    Network { url: String, message: String },

    #[error("Unexpected response from {url}: {reason}")]
    InvalidResponse { url: String, reason: String },

    #[error("Failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Repository backend unavailable: {reason}")]
    Unsupported { reason: String },
}

/// Structured-parse failures. These never leave the parser: they select the regex fallback.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("No grammar available for {language}")]
    GrammarUnavailable { language: String },

    #[error("Parser produced no syntax tree for {path}")]
    NoTree { path: String },

    #[error("Syntax error in {path} at line {line}")]
    Syntax { path: String, line: usize },
}

/// Errors raised while importing an analysis snapshot
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Snapshot root must be a JSON object")]
    InvalidRoot,

    #[error("Snapshot is missing required key '{key}'")]
    MissingKey { key: String },

    #[error("Snapshot JSON is malformed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to access snapshot file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Configuration loading and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write configuration file {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid TOML in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Unable to determine configuration directory")]
    NoConfigDir,
}

/// Result type alias for codescope operations
pub type CodeScopeResult<T> = Result<T, CodeScopeError>;
