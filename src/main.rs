use anyhow::Result;
use codescope::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run_cli().await
}
