use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, ACCEPT, USER_AGENT};
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::core::constants::limits::{
    CACHE_TTL_SECONDS, ENRICHMENT_MIN_REMAINING, REQUEST_TIMEOUT_SECONDS,
};
use crate::core::errors::RepositoryError;
use crate::core::types::FileRecord;

use super::response_cache::ResponseCache;
use super::{
    summarize_authors, CommitAuthor, FileFilter, RateLimitStatus, RepositoryClient, RepositoryId,
};

const JSON_MEDIA_TYPE: &str = "application/vnd.github.v3+json";
const RAW_MEDIA_TYPE: &str = "application/vnd.github.raw";
const COMMIT_SAMPLE: u32 = 50;

#[derive(Debug, Clone)]
pub struct GitHubConfig {
    pub api_base_url: String,
    pub token: Option<String>,
    pub cache_ttl_seconds: u64,
    pub request_timeout_seconds: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.github.com".to_string(),
            token: None,
            cache_ttl_seconds: CACHE_TTL_SECONDS,
            request_timeout_seconds: REQUEST_TIMEOUT_SECONDS,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RepoInfo {
    default_branch: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TreeResponse {
    tree: Option<Vec<TreeEntry>>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct TreeEntry {
    path: String,
    #[serde(rename = "type")]
    kind: String,
    size: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RateLimitResponse {
    resources: RateLimitResources,
}

#[derive(Debug, Deserialize)]
struct RateLimitResources {
    core: RateLimitCore,
}

#[derive(Debug, Deserialize)]
struct RateLimitCore {
    remaining: u32,
    limit: u32,
    reset: i64,
}

#[derive(Debug, Deserialize)]
struct CommitEntry {
    commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    author: Option<CommitPerson>,
}

#[derive(Debug, Deserialize)]
struct CommitPerson {
    name: String,
}

/// GitHub REST client with a per-URL response cache.
pub struct GitHubClient {
    http: Client,
    base_url: String,
    token: Option<String>,
    cache: ResponseCache,
    rate_limit: RwLock<RateLimitStatus>,
    filter: FileFilter,
}

impl GitHubClient {
    pub fn new(config: GitHubConfig) -> Result<Self, RepositoryError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| RepositoryError::Network {
                url: config.api_base_url.clone(),
                message: e.to_string(),
            })?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token: config.token.filter(|t| !t.is_empty()),
            cache: ResponseCache::new(config.cache_ttl_seconds),
            rate_limit: RwLock::new(RateLimitStatus::default()),
            filter: FileFilter::default(),
        })
    }

    pub fn with_filter(mut self, filter: FileFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    async fn record_rate_limit(&self, headers: &HeaderMap) {
        let read = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string);
        let mut status = self.rate_limit.write().await;
        if let Some(remaining) = read("x-ratelimit-remaining").and_then(|v| v.parse().ok()) {
            status.remaining = remaining;
        }
        if let Some(limit) = read("x-ratelimit-limit").and_then(|v| v.parse().ok()) {
            status.limit = limit;
        }
        if let Some(reset) = read("x-ratelimit-reset").and_then(|v| v.parse().ok()) {
            status.reset = reset;
        }
    }

    async fn get_text(&self, url: &str, accept: &str) -> Result<String, RepositoryError> {
        if let Some(body) = self.cache.get(url) {
            debug!(url, "cache hit");
            return Ok(body);
        }

        let body = self.fetch_text(url, accept).await?;
        self.cache.insert(url, body.clone());
        Ok(body)
    }

    /// Send the request without consulting or filling the response cache.
    async fn fetch_text(&self, url: &str, accept: &str) -> Result<String, RepositoryError> {
        let mut request = self
            .http
            .get(url)
            .header(ACCEPT, accept)
            .header(USER_AGENT, concat!("codescope/", env!("CARGO_PKG_VERSION")));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| RepositoryError::Network {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        self.record_rate_limit(response.headers()).await;
        let status = response.status();
        let body = response.text().await.map_err(|e| RepositoryError::Network {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        if !status.is_success() {
            let budget = *self.rate_limit.read().await;
            return Err(classify_failure(status, budget, url, &body));
        }

        Ok(body)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, RepositoryError> {
        let body = self.get_text(url, JSON_MEDIA_TYPE).await?;
        decode_json(url, &body)
    }

    fn contents_url(&self, repo: &RepositoryId, path: &str) -> Option<Url> {
        let mut url = Url::parse(&format!(
            "{}/repos/{}/{}/contents",
            self.base_url, repo.owner, repo.repo
        ))
        .ok()?;
        url.path_segments_mut()
            .ok()?
            .extend(path.split('/').filter(|s| !s.is_empty()));
        Some(url)
    }
}

fn decode_json<T: DeserializeOwned>(url: &str, body: &str) -> Result<T, RepositoryError> {
    serde_json::from_str(body).map_err(|e| RepositoryError::InvalidResponse {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

/// Map a failed response onto the error taxonomy. An exhausted budget on 403/429
/// is a rate limit; any other 403 is a plain permission failure.
fn classify_failure(
    status: StatusCode,
    budget: RateLimitStatus,
    url: &str,
    body: &str,
) -> RepositoryError {
    match status {
        StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS if budget.remaining == 0 => {
            RepositoryError::RateLimited {
                reset: budget.reset,
            }
        }
        StatusCode::TOO_MANY_REQUESTS => RepositoryError::RateLimited {
            reset: budget.reset,
        },
        StatusCode::FORBIDDEN => RepositoryError::Forbidden {
            message: if body.is_empty() {
                url.to_string()
            } else {
                body.chars().take(200).collect()
            },
        },
        StatusCode::NOT_FOUND => RepositoryError::NotFound {
            resource: url.to_string(),
        },
        other => RepositoryError::InvalidResponse {
            url: url.to_string(),
            reason: format!("HTTP {other}"),
        },
    }
}

fn records_from_tree(entries: Vec<TreeEntry>, filter: &FileFilter) -> Vec<FileRecord> {
    entries
        .into_iter()
        .filter(|e| e.kind == "blob")
        .filter_map(|e| filter.record(&e.path, e.size.unwrap_or(0)))
        .collect()
}

#[async_trait]
impl RepositoryClient for GitHubClient {
    async fn list_files(&self, repo: &RepositoryId) -> Result<Vec<FileRecord>, RepositoryError> {
        let info: RepoInfo = self
            .get_json(&format!("{}/repos/{}/{}", self.base_url, repo.owner, repo.repo))
            .await?;
        let branch = info.default_branch.unwrap_or_else(|| "main".to_string());

        let tree_url = format!(
            "{}/repos/{}/{}/git/trees/{}?recursive=1",
            self.base_url, repo.owner, repo.repo, branch
        );
        let tree: TreeResponse = self.get_json(&tree_url).await?;
        if tree.truncated {
            warn!(%repo, "tree listing truncated by the API; some files are missing");
        }
        let entries = tree.tree.ok_or_else(|| RepositoryError::InvalidResponse {
            url: tree_url.clone(),
            reason: "Invalid tree response".to_string(),
        })?;

        let files = records_from_tree(entries, &self.filter);
        debug!(%repo, %branch, files = files.len(), "listed repository tree");
        Ok(files)
    }

    async fn get_file_content(&self, repo: &RepositoryId, path: &str) -> Option<String> {
        let url = self.contents_url(repo, path)?;
        match self.get_text(url.as_str(), RAW_MEDIA_TYPE).await {
            Ok(body) => Some(body),
            Err(err) => {
                warn!(path, error = %err, "failed to fetch file content");
                None
            }
        }
    }

    async fn rate_limit_status(&self) -> RateLimitStatus {
        // Never served from the response cache.
        let url = format!("{}/rate_limit", self.base_url);
        let response = self
            .fetch_text(&url, JSON_MEDIA_TYPE)
            .await
            .and_then(|body| decode_json::<RateLimitResponse>(&url, &body));
        match response {
            Ok(response) => {
                let core = response.resources.core;
                let status = RateLimitStatus {
                    remaining: core.remaining,
                    limit: core.limit,
                    reset: core.reset,
                };
                *self.rate_limit.write().await = status;
                status
            }
            Err(_) => *self.rate_limit.read().await,
        }
    }

    async fn file_commit_authors(&self, repo: &RepositoryId, path: &str) -> Vec<CommitAuthor> {
        let remaining = self.rate_limit.read().await.remaining;
        if remaining < ENRICHMENT_MIN_REMAINING && !self.has_token() {
            debug!(path, remaining, "skipping commit history, budget low");
            return Vec::new();
        }

        let Ok(mut url) = Url::parse(&format!(
            "{}/repos/{}/{}/commits",
            self.base_url, repo.owner, repo.repo
        )) else {
            return Vec::new();
        };
        url.query_pairs_mut()
            .append_pair("per_page", &COMMIT_SAMPLE.to_string())
            .append_pair("path", path);

        match self.get_json::<Vec<CommitEntry>>(url.as_str()).await {
            Ok(commits) => summarize_authors(
                commits
                    .into_iter()
                    .filter_map(|c| c.commit.author.map(|a| a.name)),
            ),
            Err(err) => {
                debug!(path, error = %err, "commit history unavailable");
                Vec::new()
            }
        }
    }
}
