#![allow(dead_code)]

use async_trait::async_trait;
use codescope::core::errors::RepositoryError;
use codescope::core::repository::{
    CommitAuthor, InMemoryRepositoryClient, RateLimitStatus, RepositoryClient, RepositoryId,
};
use codescope::core::types::FileRecord;
use mockall::mock;

mock! {
    pub Repository {}

    #[async_trait]
    impl RepositoryClient for Repository {
        async fn list_files(&self, repo: &RepositoryId) -> Result<Vec<FileRecord>, RepositoryError>;
        async fn get_file_content(&self, repo: &RepositoryId, path: &str) -> Option<String>;
        async fn rate_limit_status(&self) -> RateLimitStatus;
        async fn file_commit_authors(&self, repo: &RepositoryId, path: &str) -> Vec<CommitAuthor>;
    }
}

/// Shared fixtures for integration tests
pub mod fixtures {
    use super::*;

    pub fn repo_id() -> RepositoryId {
        RepositoryId::new("acme", "demo")
    }

    /// Source text with `content` placed on the given 1-based lines, blanks elsewhere.
    pub fn lines_at(placed: &[(usize, &str)]) -> String {
        let last = placed.iter().map(|(line, _)| *line).max().unwrap_or(0);
        let mut lines = vec![String::new(); last];
        for (line, text) in placed {
            lines[line - 1] = text.to_string();
        }
        lines.join("\n") + "\n"
    }

    /// `a.ts` defines `helper`; `b.ts` imports it and calls it on lines 10 and 20.
    pub fn helper_repository() -> InMemoryRepositoryClient {
        InMemoryRepositoryClient::new()
            .with_file("a.ts", "export function helper() {\n  return 42;\n}\n")
            .with_file(
                "b.ts",
                lines_at(&[
                    (1, "import { helper } from './a';"),
                    (10, "const first = helper();"),
                    (20, "const second = helper();"),
                ]),
            )
    }

    /// Nine small modules calling each other in a ring.
    pub fn nine_file_repository() -> InMemoryRepositoryClient {
        (0..9).fold(InMemoryRepositoryClient::new(), |client, idx| {
            let next = (idx + 1) % 9;
            let content = format!(
                "import {{ step{next} }} from './mod{next}';\n\nexport function step{idx}(n: number): number {{\n  if (n <= 0) {{\n    return 0;\n  }}\n  return step{next}(n - 1);\n}}\n"
            );
            client.with_file(format!("src/mod{idx}.ts"), content)
        })
    }

    pub const BROKEN_FILE: &str = "src/broken.ts";

    /// The nine modules plus a tenth whose body can never be fetched.
    pub fn ten_file_repository() -> InMemoryRepositoryClient {
        nine_file_repository().with_unreadable_file(BROKEN_FILE, 512)
    }

    /// Source that no grammar accepts and no fallback pattern matches.
    pub const MALFORMED_SOURCE: &str = "}}} ((( =>\n";

    /// The nine modules plus a tenth that fails structured parsing outright.
    pub fn malformed_file_repository() -> InMemoryRepositoryClient {
        nine_file_repository().with_file(BROKEN_FILE, MALFORMED_SOURCE)
    }
}
