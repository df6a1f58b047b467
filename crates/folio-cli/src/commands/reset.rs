//! Reset command implementation.

use crate::cli::ResetArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use folio_domain::traits::CheckpointStore;
use folio_domain::DocumentId;
use folio_store::{ArtifactLayout, CsvTableSink, FileCheckpointStore};
use std::io::{self, Write};

/// Execute the reset command.
pub async fn execute_reset(args: ResetArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let profile = config.profile(&args.documents.profile)?;
    let layout = config.layout(&profile);

    let ids = args
        .documents
        .inputs
        .iter()
        .map(|path| {
            DocumentId::from_path(path).ok_or_else(|| {
                CliError::InvalidInput(format!("{} has no file name", path.display()))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    // Confirm unless --yes is specified
    if !args.yes {
        println!("About to reset {} document(s):", ids.len());
        for id in &ids {
            println!("  - {}", layout.checkpoint_path(id).display());
            if args.purge_output {
                println!("  - {}", layout.table_path(id).display());
            }
        }
        print!("Continue? [y/N] ");
        io::stdout().flush()?;

        let mut response = String::new();
        io::stdin().read_line(&mut response)?;

        if !response.trim().eq_ignore_ascii_case("y") {
            println!("{}", formatter.info("Operation cancelled"));
            return Ok(());
        }
    }

    for id in &ids {
        reset_document(&layout, id, args.purge_output)?;
        let what = if args.purge_output { "progress and output" } else { "progress" };
        println!("{}", formatter.success(&format!("{}: {} reset", id, what)));
    }

    Ok(())
}

/// Clear the checkpoint of a document and, with `purge_output`, its table.
///
/// Keeping the table while clearing the checkpoint means the next run
/// appends a second copy of every row.
pub fn reset_document(layout: &ArtifactLayout, id: &DocumentId, purge_output: bool) -> Result<()> {
    FileCheckpointStore::new(layout.clone()).clear(id)?;
    if purge_output {
        CsvTableSink::new(layout.clone()).remove(id)?;
    }
    Ok(())
}
