//! Sources of repository files.
//!
//! A [`RepositoryClient`] lists file metadata and serves file bodies. Content
//! fetches never fail: anything that goes wrong is logged and reported as `None`,
//! so one unreachable file cannot sink a run.

mod filter;
#[cfg(feature = "network")]
pub mod github;
pub mod local;
pub mod memory;
#[cfg(feature = "network")]
mod response_cache;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::errors::RepositoryError;
use crate::core::types::FileRecord;

pub use filter::FileFilter;
#[cfg(feature = "network")]
pub use github::GitHubClient;
pub use local::LocalRepositoryClient;
pub use memory::InMemoryRepositoryClient;

/// `owner/repo` pair identifying a hosted repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryId {
    pub owner: String,
    pub repo: String,
}

static HOST_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:https?://)?(?:www\.)?github\.com/").unwrap());

static OWNER_REPO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([a-zA-Z0-9_.-]+)/([a-zA-Z0-9_.-]+)$").unwrap());

impl RepositoryId {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// Accepts `owner/repo` or a `github.com` URL (scheme, `www.` and a trailing `/` optional).
    pub fn parse(input: &str) -> Result<Self, RepositoryError> {
        let trimmed = input.trim();
        let without_host = HOST_PREFIX.replace(trimmed, "");
        let pair = without_host
            .strip_suffix('/')
            .unwrap_or(without_host.as_ref());

        let caps = OWNER_REPO
            .captures(pair)
            .ok_or_else(|| RepositoryError::InvalidIdentifier {
                input: input.to_string(),
            })?;
        Ok(Self::new(&caps[1], &caps[2]))
    }
}

impl FromStr for RepositoryId {
    type Err = RepositoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Remaining request budget as last reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitStatus {
    pub remaining: u32,
    pub limit: u32,
    /// Unix timestamp (seconds) at which the budget refills.
    pub reset: i64,
}

impl RateLimitStatus {
    /// Budget of an unauthenticated client that has not made a request yet.
    pub const UNAUTHENTICATED: Self = Self {
        remaining: 60,
        limit: 60,
        reset: 0,
    };

    /// Effectively unlimited, for sources that are not rate limited.
    pub const UNLIMITED: Self = Self {
        remaining: u32::MAX,
        limit: u32::MAX,
        reset: 0,
    };
}

impl Default for RateLimitStatus {
    fn default() -> Self {
        Self::UNAUTHENTICATED
    }
}

/// Share of a file's recent commits made by one author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitAuthor {
    pub name: String,
    pub commits: u32,
    pub percent: u32,
}

/// Tally commit author names into a breakdown, most commits first.
pub fn summarize_authors<I, S>(names: I) -> Vec<CommitAuthor>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut counts: std::collections::BTreeMap<String, u32> = std::collections::BTreeMap::new();
    let mut total = 0u32;
    for name in names {
        *counts.entry(name.into()).or_default() += 1;
        total += 1;
    }

    let mut authors: Vec<CommitAuthor> = counts
        .into_iter()
        .map(|(name, commits)| CommitAuthor {
            name,
            commits,
            percent: (commits as f64 / total as f64 * 100.0).round() as u32,
        })
        .collect();
    authors.sort_by(|a, b| b.commits.cmp(&a.commits).then_with(|| a.name.cmp(&b.name)));
    authors
}

#[async_trait]
pub trait RepositoryClient: Send + Sync {
    /// Metadata for every included file. Failing here fails the run.
    async fn list_files(&self, repo: &RepositoryId) -> Result<Vec<FileRecord>, RepositoryError>;

    /// Decoded file text, or `None` on any fetch or decode failure.
    async fn get_file_content(&self, repo: &RepositoryId, path: &str) -> Option<String>;

    /// Advisory budget; callers may skip optional requests when it runs low.
    async fn rate_limit_status(&self) -> RateLimitStatus;

    /// Commit authorship for one file. Empty when unsupported or skipped.
    async fn file_commit_authors(&self, repo: &RepositoryId, path: &str) -> Vec<CommitAuthor>;
}
