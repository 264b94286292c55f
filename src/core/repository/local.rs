use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::core::errors::RepositoryError;
use crate::core::types::FileRecord;

use super::{CommitAuthor, FileFilter, RateLimitStatus, RepositoryClient, RepositoryId};

/// Serves a checkout on the local filesystem.
pub struct LocalRepositoryClient {
    root: PathBuf,
    filter: FileFilter,
}

impl LocalRepositoryClient {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            filter: FileFilter::default(),
        }
    }

    pub fn with_filter(mut self, filter: FileFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Identifier used in reports: `local/<directory name>`.
    pub fn repository_id(&self) -> RepositoryId {
        let name = self
            .root
            .canonicalize()
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "checkout".to_string());
        RepositoryId::new("local", name)
    }

    /// Relative paths only; anything escaping the root is refused.
    fn resolve(&self, relative: &str) -> Option<PathBuf> {
        let rel = Path::new(relative);
        let safe = rel
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        safe.then(|| self.root.join(rel))
    }
}

fn to_posix(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn walk(root: &Path, filter: &FileFilter) -> Result<Vec<FileRecord>, RepositoryError> {
    if !root.is_dir() {
        return Err(RepositoryError::NotFound {
            resource: root.display().to_string(),
        });
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry.file_type().is_dir()
                || !filter.is_dir_ignored(&entry.file_name().to_string_lossy())
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(error = %err, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let path = to_posix(relative);
        let size = entry.metadata().map(|m| m.len()).unwrap_or(0);

        if let Some(record) = filter.record(&path, size) {
            files.push(record);
        }
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

#[async_trait]
impl RepositoryClient for LocalRepositoryClient {
    async fn list_files(&self, _repo: &RepositoryId) -> Result<Vec<FileRecord>, RepositoryError> {
        let root = self.root.clone();
        let filter = self.filter.clone();
        let files = tokio::task::spawn_blocking(move || walk(&root, &filter))
            .await
            .map_err(|e| RepositoryError::Unsupported {
                reason: format!("directory walk aborted: {e}"),
            })??;
        debug!(root = %self.root.display(), files = files.len(), "listed local checkout");
        Ok(files)
    }

    async fn get_file_content(&self, _repo: &RepositoryId, path: &str) -> Option<String> {
        let full = self.resolve(path)?;
        match tokio::fs::read(&full).await {
            Ok(bytes) => match String::from_utf8(bytes) {
                Ok(text) => Some(text),
                Err(_) => {
                    debug!(path, "not valid UTF-8, skipping content");
                    None
                }
            },
            Err(err) => {
                warn!(path, error = %err, "failed to read file");
                None
            }
        }
    }

    async fn rate_limit_status(&self) -> RateLimitStatus {
        RateLimitStatus::UNLIMITED
    }

    async fn file_commit_authors(&self, _repo: &RepositoryId, _path: &str) -> Vec<CommitAuthor> {
        Vec::new()
    }
}
