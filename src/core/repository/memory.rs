use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::core::errors::RepositoryError;
use crate::core::types::FileRecord;

use super::{
    summarize_authors, CommitAuthor, FileFilter, RateLimitStatus, RepositoryClient, RepositoryId,
};

#[derive(Debug, Clone)]
struct StoredFile {
    size: u64,
    content: Option<String>,
}

/// Fixed set of files held in memory.
///
/// Used for tests and for re-analysing the contents of a saved snapshot offline.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepositoryClient {
    files: BTreeMap<String, StoredFile>,
    authors: BTreeMap<String, Vec<String>>,
    rate_limit: Option<RateLimitStatus>,
    filter: FileFilter,
}

impl InMemoryRepositoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        self.files.insert(
            path.into(),
            StoredFile {
                size: content.len() as u64,
                content: Some(content),
            },
        );
        self
    }

    /// A listed file whose content can never be fetched.
    pub fn with_unreadable_file(mut self, path: impl Into<String>, size: u64) -> Self {
        self.files.insert(path.into(), StoredFile { size, content: None });
        self
    }

    pub fn with_commit_authors<I, S>(mut self, path: impl Into<String>, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.authors
            .insert(path.into(), authors.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_rate_limit(mut self, status: RateLimitStatus) -> Self {
        self.rate_limit = Some(status);
        self
    }

    pub fn with_filter(mut self, filter: FileFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Serve the files of an earlier analysis, content included where it was kept.
    pub fn from_records(records: &[FileRecord]) -> Self {
        records.iter().fold(Self::new(), |client, record| match &record.content {
            Some(content) => client.with_file(record.path.clone(), content.clone()),
            None => client.with_unreadable_file(record.path.clone(), record.size),
        })
    }
}

#[async_trait]
impl RepositoryClient for InMemoryRepositoryClient {
    async fn list_files(&self, _repo: &RepositoryId) -> Result<Vec<FileRecord>, RepositoryError> {
        Ok(self
            .files
            .iter()
            .filter_map(|(path, file)| self.filter.record(path, file.size))
            .collect())
    }

    async fn get_file_content(&self, _repo: &RepositoryId, path: &str) -> Option<String> {
        self.files.get(path).and_then(|f| f.content.clone())
    }

    async fn rate_limit_status(&self) -> RateLimitStatus {
        self.rate_limit.unwrap_or(RateLimitStatus::UNLIMITED)
    }

    async fn file_commit_authors(&self, _repo: &RepositoryId, path: &str) -> Vec<CommitAuthor> {
        self.authors
            .get(path)
            .map(|names| summarize_authors(names.iter().cloned()))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_serves_listed_files() {
        let client = InMemoryRepositoryClient::new()
            .with_file("src/a.ts", "export const a = 1;")
            .with_unreadable_file("src/big.ts", 500_000)
            .with_file("dist/out.js", "ignored");
        let id = RepositoryId::new("acme", "demo");

        let files = client.list_files(&id).await.unwrap();
        let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["src/a.ts", "src/big.ts"]);
        assert_eq!(files[1].size, 500_000);

        assert!(client.get_file_content(&id, "src/a.ts").await.is_some());
        assert!(client.get_file_content(&id, "src/big.ts").await.is_none());
    }

    #[tokio::test]
    async fn test_from_records_round_trip() {
        let mut analyzed = FileRecord::from_path("a.py", 3, true);
        analyzed.content = Some("x=1".into());
        let bare = FileRecord::from_path("b.py", 9, true);

        let client = InMemoryRepositoryClient::from_records(&[analyzed, bare]);
        let id = RepositoryId::new("local", "snapshot");
        assert_eq!(client.get_file_content(&id, "a.py").await.as_deref(), Some("x=1"));
        assert_eq!(client.list_files(&id).await.unwrap()[1].size, 9);
    }
}
