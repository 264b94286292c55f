//! Configuration for codescope
//!
//! Every section defaults independently, so a file only needs the keys it changes:
//!
//! ```toml
//! [fetch]
//! max_concurrent_fetches = 4
//!
//! [scan]
//! exclude_patterns = ["**/*.test.ts"]
//! ```

pub mod paths;
pub mod validation;

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::constants::{complexity, limits, IGNORED_DIRS};
use crate::core::errors::ConfigError;
use crate::core::parser::ComplexityThresholds;
use crate::core::pipeline::PipelineOptions;
use crate::core::repository::FileFilter;

pub use paths::{config_dir, config_file};
pub use validation::validate_config;

pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub max_concurrent_fetches: usize,
    pub max_file_size: u64,
    pub cache_ttl_seconds: u64,
    pub request_timeout_seconds: u64,
    pub api_base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: limits::MAX_CONCURRENT_FETCHES,
            max_file_size: limits::MAX_FILE_SIZE,
            cache_ttl_seconds: limits::CACHE_TTL_SECONDS,
            request_timeout_seconds: limits::REQUEST_TIMEOUT_SECONDS,
            api_base_url: "https://api.github.com".to_string(),
            token: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub ignored_dirs: Vec<String>,
    pub exclude_patterns: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            ignored_dirs: IGNORED_DIRS.iter().map(|d| d.to_string()).collect(),
            exclude_patterns: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub blast_radius_depth: u32,
    pub complexity_medium_above: u32,
    pub complexity_high_above: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            blast_radius_depth: limits::BLAST_RADIUS_DEPTH,
            complexity_medium_above: complexity::MEDIUM_ABOVE,
            complexity_high_above: complexity::HIGH_ABOVE,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeScopeConfig {
    pub fetch: FetchConfig,
    pub scan: ScanConfig,
    pub analysis: AnalysisConfig,
}

impl CodeScopeConfig {
    /// Parse and validate a TOML document. `origin` only labels errors.
    pub fn from_toml_str(content: &str, origin: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_toml_str(&content, path)
    }

    pub async fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path).await
        } else {
            debug!(path = %path.display(), "no configuration file, using defaults");
            Ok(Self::default())
        }
    }

    /// Load an explicit file (which must exist), or the platform default if present.
    /// Environment overrides are applied last.
    pub async fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => Self::load(path).await?,
            None => match config_file() {
                Ok(path) => Self::load_or_default(&path).await?,
                Err(ConfigError::NoConfigDir) => Self::default(),
                Err(err) => return Err(err),
            },
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// `GITHUB_TOKEN` replaces any token from the file.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup(TOKEN_ENV).filter(|t| !t.trim().is_empty()) {
            self.fetch.token = Some(token);
        }
    }

    pub async fn save(&self, path: &Path) -> Result<(), ConfigError> {
        self.validate()?;
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::InvalidValue {
            field: "config".to_string(),
            reason: e.to_string(),
        })?;
        tokio::fs::write(path, content).await.map_err(write_err)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_config(self)
    }

    pub fn thresholds(&self) -> ComplexityThresholds {
        ComplexityThresholds {
            medium_above: self.analysis.complexity_medium_above,
            high_above: self.analysis.complexity_high_above,
        }
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            max_concurrent_fetches: self.fetch.max_concurrent_fetches,
            max_file_size: self.fetch.max_file_size,
            thresholds: self.thresholds(),
        }
    }

    pub fn file_filter(&self) -> Result<FileFilter, ConfigError> {
        FileFilter::new()
            .with_ignored_dirs(self.scan.ignored_dirs.iter().cloned())
            .with_exclude_patterns(&self.scan.exclude_patterns)
    }

    #[cfg(feature = "network")]
    pub fn github_config(&self) -> crate::core::repository::github::GitHubConfig {
        crate::core::repository::github::GitHubConfig {
            api_base_url: self.fetch.api_base_url.clone(),
            token: self.fetch.token.clone(),
            cache_ttl_seconds: self.fetch.cache_ttl_seconds,
            request_timeout_seconds: self.fetch.request_timeout_seconds,
        }
    }
}
