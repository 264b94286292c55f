use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, info};

use crate::cli::args::{AnalyzeArgs, OutputFormat};
use crate::cli::commands::{utils, Command};
use crate::cli::report::render_summary;
use crate::config::CodeScopeConfig;
use crate::core::errors::CodeScopeError;
use crate::core::pipeline::{AnalysisPipeline, ProgressPhase};
use crate::core::repository::{FileFilter, LocalRepositoryClient, RepositoryClient, RepositoryId};
use crate::export;

pub struct AnalyzeCommand {
    args: AnalyzeArgs,
    config: CodeScopeConfig,
}

impl AnalyzeCommand {
    pub fn new(args: AnalyzeArgs, mut config: CodeScopeConfig) -> Self {
        if let Some(token) = args.token.clone() {
            config.fetch.token = Some(token);
        }
        Self { args, config }
    }

    fn client(&self, filter: FileFilter) -> Result<(Arc<dyn RepositoryClient>, RepositoryId)> {
        if self.args.local {
            let client = LocalRepositoryClient::new(&self.args.target).with_filter(filter);
            let id = client.repository_id();
            return Ok((Arc::new(client), id));
        }

        let id = RepositoryId::parse(&self.args.target).map_err(CodeScopeError::from)?;
        Ok((remote_client(&self.config, filter)?, id))
    }
}

#[cfg(feature = "network")]
fn remote_client(
    config: &CodeScopeConfig,
    filter: FileFilter,
) -> Result<Arc<dyn RepositoryClient>> {
    use crate::core::repository::GitHubClient;

    let client = GitHubClient::new(config.github_config())
        .map_err(CodeScopeError::from)?
        .with_filter(filter);
    if !client.has_token() {
        info!("no GitHub token configured; unauthenticated requests are limited to 60 per hour");
    }
    Ok(Arc::new(client))
}

#[cfg(not(feature = "network"))]
fn remote_client(
    _config: &CodeScopeConfig,
    _filter: FileFilter,
) -> Result<Arc<dyn RepositoryClient>> {
    anyhow::bail!("remote repositories need the `network` feature; rebuild with it or pass --local")
}

fn log_progress(phase: ProgressPhase, file: Option<&str>) {
    match file {
        Some(file) => debug!(%phase, file, "progress"),
        None => info!(%phase, "progress"),
    }
}

#[async_trait]
impl Command for AnalyzeCommand {
    async fn execute(&self) -> Result<()> {
        let filter = self.config.file_filter()?;
        let (client, repo) = self.client(filter)?;

        let pipeline = AnalysisPipeline::with_options(client, self.config.pipeline_options());
        let result = match pipeline.analyze(&repo, &log_progress).await {
            Ok(result) => result,
            Err(err) => {
                if err.is_rate_limited() {
                    eprintln!(
                        "hint: the GitHub API rate limit is exhausted; pass --token or set GITHUB_TOKEN"
                    );
                }
                return Err(err.into());
            }
        };

        let output = self.args.output.as_deref();
        utils::configure_colors(output.is_some());
        let text = match self.args.format {
            OutputFormat::Json => export::to_json(&result).map_err(CodeScopeError::from)?,
            OutputFormat::Csv => export::to_csv(&result),
            OutputFormat::Summary => render_summary(&repo.to_string(), &result),
        };
        utils::emit(output, &text).await
    }
}
