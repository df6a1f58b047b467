//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Folio - Extract bibliography entries from long texts into CSV tables.
#[derive(Debug, Parser)]
#[command(name = "folio")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path (default: ~/.folio/config.toml)
    #[arg(short, long, global = true, env = "FOLIO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract entries from documents, resuming where a previous run stopped
    Extract(ExtractArgs),

    /// Show progress for documents
    Status(DocumentArgs),

    /// Forget progress so documents are processed from the start
    Reset(ResetArgs),

    /// Show how a document would be chunked, without calling the LLM
    Chunks(ChunksArgs),

    /// List available source profiles
    Profiles(ProfilesArgs),
}

/// Documents plus the profile that governs them.
#[derive(Debug, Parser)]
pub struct DocumentArgs {
    /// Source text files
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Source profile (built-in or defined in the config file)
    #[arg(short, long, default_value = "generic")]
    pub profile: String,
}

/// Arguments for the extract command.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    #[command(flatten)]
    pub documents: DocumentArgs,

    /// Model override
    #[arg(short, long)]
    pub model: Option<String>,
}

/// Arguments for the reset command.
#[derive(Debug, Parser)]
pub struct ResetArgs {
    #[command(flatten)]
    pub documents: DocumentArgs,

    /// Also delete the output tables
    #[arg(long)]
    pub purge_output: bool,

    /// Skip confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,
}

/// Arguments for the chunks command.
#[derive(Debug, Parser)]
pub struct ChunksArgs {
    /// Source text file
    pub input: PathBuf,

    /// Source profile (built-in or defined in the config file)
    #[arg(short, long, default_value = "generic")]
    pub profile: String,

    /// Characters of each chunk to show
    #[arg(long, default_value = "60")]
    pub preview: usize,

    /// Maximum number of chunks to list
    #[arg(short, long)]
    pub limit: Option<usize>,
}

/// Arguments for the profiles command.
#[derive(Debug, Parser)]
pub struct ProfilesArgs {
    /// Print one profile as TOML
    #[arg(long)]
    pub show: Option<String>,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_command() {
        let cli = Cli::parse_from(["folio", "extract", "kaplan.txt", "-p", "kaplan"]);
        match cli.command {
            Command::Extract(args) => {
                assert_eq!(args.documents.inputs, vec![PathBuf::from("kaplan.txt")]);
                assert_eq!(args.documents.profile, "kaplan");
                assert!(args.model.is_none());
            }
            _ => panic!("Expected Extract command"),
        }
    }

    #[test]
    fn test_default_profile() {
        let cli = Cli::parse_from(["folio", "status", "a.txt", "b.txt"]);
        match cli.command {
            Command::Status(args) => {
                assert_eq!(args.inputs.len(), 2);
                assert_eq!(args.profile, "generic");
            }
            _ => panic!("Expected Status command"),
        }
    }

    #[test]
    fn test_extract_requires_inputs() {
        assert!(Cli::try_parse_from(["folio", "extract"]).is_err());
    }

    #[test]
    fn test_reset_flags() {
        let cli = Cli::parse_from(["folio", "reset", "doc.txt", "--purge-output", "-y"]);
        match cli.command {
            Command::Reset(args) => {
                assert!(args.purge_output);
                assert!(args.yes);
            }
            _ => panic!("Expected Reset command"),
        }
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["folio", "profiles", "-vv", "--no-color", "--format", "json"]);
        assert_eq!(cli.verbose, 2);
        assert!(cli.no_color);
        assert!(matches!(cli.format, Some(CliFormat::Json)));
    }
}
