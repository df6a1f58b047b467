//! Folio CLI - Extract bibliography entries from long texts into CSV tables.

use clap::Parser;
use folio_cli::commands;
use folio_cli::{Cli, Command, Config, Formatter};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> folio_cli::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let config = Config::load(cli.config.as_deref())?;

    // Determine output format
    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);

    // Determine color setting
    let color_enabled = !cli.no_color && config.settings.color;

    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Extract(args) => commands::execute_extract(args, &config, &formatter).await?,
        Command::Status(args) => commands::execute_status(args, &config, &formatter).await?,
        Command::Reset(args) => commands::execute_reset(args, &config, &formatter).await?,
        Command::Chunks(args) => commands::execute_chunks(args, &config, &formatter).await?,
        Command::Profiles(args) => commands::execute_profiles(args, &config, &formatter).await?,
    }

    Ok(())
}

/// Logs go to stderr so tables and JSON on stdout stay clean.
///
/// `-v` and `-vv` override `RUST_LOG`; otherwise it applies, defaulting to info.
fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
