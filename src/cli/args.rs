use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Static dependency, dead-code and blast-radius analysis for source repositories.
///
/// ```bash
/// # Analyze a GitHub repository and print a summary
/// codescope analyze facebook/react --format summary
///
/// # Analyze a local checkout and save a snapshot
/// codescope analyze ./my-project --local --output analysis.json
///
/// # Impact of changing one file, from a saved snapshot
/// codescope blast analysis.json src/utils/format.ts
/// ```
#[derive(Parser)]
#[command(name = "codescope")]
#[command(about = "Static dependency, dead-code and blast-radius analysis for source repositories")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (default: platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a repository
    Analyze(AnalyzeArgs),

    /// Show the blast radius of one file in a saved snapshot
    Blast(BlastArgs),

    /// Check that a snapshot file is well formed
    Validate {
        /// Snapshot JSON file
        snapshot: PathBuf,
    },

    /// Print the health score of a saved snapshot
    Health {
        /// Snapshot JSON file
        snapshot: PathBuf,
    },
}

#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    /// `owner/repo`, a GitHub URL, or a directory with --local
    pub target: String,

    /// Analyze a local checkout instead of a GitHub repository
    #[arg(long)]
    pub local: bool,

    /// GitHub token (overrides GITHUB_TOKEN and the config file)
    #[arg(long)]
    pub token: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    pub format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct BlastArgs {
    /// Snapshot JSON file
    pub snapshot: PathBuf,

    /// Repository-relative path of the file to inspect
    pub file: String,

    /// Maximum walk depth (default from config)
    #[arg(long)]
    pub depth: Option<u32>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Csv,
    Summary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_analyze() {
        let cli = Cli::try_parse_from([
            "codescope", "analyze", "acme/demo", "--format", "csv", "-o", "out.csv", "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Analyze(args) => {
                assert_eq!(args.target, "acme/demo");
                assert_eq!(args.format, OutputFormat::Csv);
                assert_eq!(args.output, Some(PathBuf::from("out.csv")));
                assert!(!args.local);
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_parse_blast() {
        let cli = Cli::try_parse_from([
            "codescope", "blast", "a.json", "src/a.ts", "--depth", "2",
        ])
        .unwrap();
        match cli.command {
            Commands::Blast(args) => {
                assert_eq!(args.file, "src/a.ts");
                assert_eq!(args.depth, Some(2));
            }
            _ => panic!("expected blast"),
        }
    }
}
