use anyhow::{Context, Result};
use async_trait::async_trait;

pub mod analyze;
pub mod snapshot;

/// Trait for CLI command implementations
#[async_trait]
pub trait Command {
    /// Execute the command with the given arguments
    async fn execute(&self) -> Result<()>;
}

/// Common utilities for command implementations
pub mod utils {
    use super::*;
    use std::path::Path;

    /// Write to `output` if given, otherwise stdout
    pub async fn emit(output: Option<&Path>, text: &str) -> Result<()> {
        match output {
            Some(path) => tokio::fs::write(path, text)
                .await
                .with_context(|| format!("Failed to write {}", path.display())),
            None => {
                print!("{text}");
                Ok(())
            }
        }
    }

    /// Colors only when stdout is a terminal
    pub fn configure_colors(writing_to_file: bool) {
        if writing_to_file || !atty::is(atty::Stream::Stdout) {
            colored::control::set_override(false);
        }
    }
}
