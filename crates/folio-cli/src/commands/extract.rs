//! Extract command implementation.

use crate::cli::ExtractArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use folio_domain::traits::{CheckpointStore, EntryExtractor, RowSink};
use folio_extractor::{Pipeline, RunReport};
use folio_store::{CsvTableSink, FileCheckpointStore, StoreError};
use std::path::PathBuf;
use tracing::error;

/// Execute the extract command.
pub async fn execute_extract(args: ExtractArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let profile = config.profile(&args.documents.profile)?;
    let layout = config.layout(&profile);
    let provider = config.provider(args.model.as_deref())?;

    let mut pipeline = Pipeline::with_provider(
        provider,
        FileCheckpointStore::new(layout.clone()),
        CsvTableSink::new(layout),
        &profile,
    )?;

    extract_documents(&mut pipeline, &args.documents.inputs, formatter).await?;
    Ok(())
}

/// Run each document in turn.
///
/// A failed document is reported and the batch moves on; the command fails
/// at the end if any document did not finish.
pub async fn extract_documents<X, C, S>(
    pipeline: &mut Pipeline<X, C, S>,
    inputs: &[PathBuf],
    formatter: &Formatter,
) -> Result<Vec<RunReport>>
where
    X: EntryExtractor,
    C: CheckpointStore<Error = StoreError>,
    S: RowSink<Error = StoreError>,
{
    let mut reports = Vec::with_capacity(inputs.len());
    let mut failed = 0;

    for input in inputs {
        match pipeline.run_path(input).await {
            Ok(report) => {
                println!("{}", formatter.run_summary(&report));
                reports.push(report);
            }
            Err(e) => {
                error!(path = %input.display(), error = %e, "Document failed");
                eprintln!("{}", formatter.error(&format!("{}: {}", input.display(), e)));
                failed += 1;
            }
        }
    }

    if failed > 0 {
        return Err(CliError::DocumentsFailed {
            failed,
            total: inputs.len(),
        });
    }
    Ok(reports)
}
