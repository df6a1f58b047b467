//! Chunks command implementation.

use crate::cli::ChunksArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use folio_domain::Chunk;
use folio_extractor::{load_source, SourceProfile, TextChunker, TextSanitizer};
use std::path::Path;

/// Execute the chunks command.
pub async fn execute_chunks(args: ChunksArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let profile = config.profile(&args.profile)?;
    let mut chunks = plan_chunks(&profile, &args.input)?;
    let total = chunks.len();

    if let Some(limit) = args.limit {
        chunks.truncate(limit);
    }

    println!("{}", formatter.format_chunks(&chunks, args.preview)?);
    if chunks.len() < total {
        println!(
            "{}",
            formatter.info(&format!("Showing {} of {} chunks", chunks.len(), total))
        );
    }
    Ok(())
}

/// Sanitize and segment a source file exactly as a run would.
pub fn plan_chunks(profile: &SourceProfile, path: &Path) -> Result<Vec<Chunk>> {
    let (_, raw) = load_source(path)?;
    let text = TextSanitizer::from_profile(profile)?.sanitize_bytes(&raw);
    Ok(TextChunker::new(&profile.chunk_strategy)?.chunk(&text))
}
