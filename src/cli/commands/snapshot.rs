use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::cli::args::BlastArgs;
use crate::cli::commands::{utils, Command};
use crate::cli::report::{render_blast, render_health};
use crate::config::CodeScopeConfig;
use crate::core::blast_radius::BlastRadiusCalculator;
use crate::core::errors::CodeScopeError;
use crate::core::metrics::HealthScore;
use crate::core::types::AnalysisResult;
use crate::export::read_snapshot;

async fn load(path: &Path) -> Result<AnalysisResult> {
    Ok(read_snapshot(path).await.map_err(CodeScopeError::from)?)
}

pub struct BlastCommand {
    args: BlastArgs,
    default_depth: u32,
}

impl BlastCommand {
    pub fn new(args: BlastArgs, config: &CodeScopeConfig) -> Self {
        Self {
            args,
            default_depth: config.analysis.blast_radius_depth,
        }
    }
}

#[async_trait]
impl Command for BlastCommand {
    async fn execute(&self) -> Result<()> {
        let result = load(&self.args.snapshot).await?;
        if result.file(&self.args.file).is_none() {
            bail!("{} is not part of the snapshot", self.args.file);
        }

        let depth = self.args.depth.unwrap_or(self.default_depth);
        let calculator =
            BlastRadiusCalculator::with_depth(&result.connections, &result.files, depth);
        let radius = calculator.calculate(&self.args.file);

        let text = if self.args.json {
            format!("{}\n", serde_json::to_string_pretty(&radius)?)
        } else {
            utils::configure_colors(false);
            render_blast(&radius)
        };
        utils::emit(None, &text).await
    }
}

pub struct ValidateCommand {
    snapshot: PathBuf,
}

impl ValidateCommand {
    pub fn new(snapshot: PathBuf) -> Self {
        Self { snapshot }
    }
}

#[async_trait]
impl Command for ValidateCommand {
    async fn execute(&self) -> Result<()> {
        let result = load(&self.snapshot).await?;
        println!(
            "{} is valid: {} files, {} connections, {} functions",
            self.snapshot.display(),
            result.files.len(),
            result.connections.len(),
            result.functions().count()
        );
        Ok(())
    }
}

pub struct HealthCommand {
    snapshot: PathBuf,
}

impl HealthCommand {
    pub fn new(snapshot: PathBuf) -> Self {
        Self { snapshot }
    }
}

#[async_trait]
impl Command for HealthCommand {
    async fn execute(&self) -> Result<()> {
        let result = load(&self.snapshot).await?;
        utils::configure_colors(false);
        let health = HealthScore::from_result(&result);
        utils::emit(None, &render_health(&health, &result)).await
    }
}
