//! Status command implementation.

use crate::cli::DocumentArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use folio_domain::traits::{CheckpointStore, RowSink};
use folio_extractor::{load_source, DocumentState, DocumentStatus, SourceProfile, TextChunker, TextSanitizer};
use folio_store::{ArtifactLayout, CsvTableSink, FileCheckpointStore};
use std::path::Path;

/// Execute the status command.
pub async fn execute_status(args: DocumentArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let profile = config.profile(&args.profile)?;
    let layout = config.layout(&profile);

    let statuses = args
        .inputs
        .iter()
        .map(|input| document_status(&profile, &layout, input))
        .collect::<Result<Vec<_>>>()?;

    println!("{}", formatter.format_statuses(&statuses, &layout)?);
    Ok(())
}

/// Segment a document and compare its chunk count with the stored cursor.
pub fn document_status(profile: &SourceProfile, layout: &ArtifactLayout, path: &Path) -> Result<DocumentStatus> {
    let (id, raw) = load_source(path)?;
    let text = TextSanitizer::from_profile(profile)?.sanitize_bytes(&raw);
    let chunk_count = TextChunker::new(&profile.chunk_strategy)?.chunk(&text).len();

    let cursor = FileCheckpointStore::new(layout.clone()).read(&id)?;
    let table_exists = CsvTableSink::new(layout.clone()).exists(&id);

    Ok(DocumentStatus {
        state: DocumentState::classify(cursor, chunk_count, table_exists),
        document: id,
        chunk_count,
        cursor,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_extractor::ChunkStrategy;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, SourceProfile, ArtifactLayout) {
        let dir = TempDir::new().unwrap();
        let profile = SourceProfile {
            chunk_strategy: ChunkStrategy::CharWindow { max_chars: 10 },
            ..SourceProfile::generic()
        };
        let layout = ArtifactLayout::new(dir.path().join("output"), dir.path().join("progress"));
        fs::write(dir.path().join("doc.txt"), "a".repeat(35)).unwrap();
        (dir, profile, layout)
    }

    #[test]
    fn test_fresh_document() {
        let (dir, profile, layout) = setup();
        let status = document_status(&profile, &layout, &dir.path().join("doc.txt")).unwrap();
        assert_eq!(status.document.as_str(), "doc.txt");
        assert_eq!(status.chunk_count, 4);
        assert_eq!(status.cursor, 0);
        assert_eq!(status.state, DocumentState::Fresh);
    }

    #[test]
    fn test_in_progress_and_ahead() {
        let (dir, profile, layout) = setup();
        let id = folio_domain::DocumentId::new("doc.txt");
        let mut checkpoints = FileCheckpointStore::new(layout.clone());
        let mut sink = CsvTableSink::new(layout.clone());
        sink.ensure_initialized(&id, &folio_domain::CANONICAL_FIELDS).unwrap();

        checkpoints.advance(&id, 2).unwrap();
        let status = document_status(&profile, &layout, &dir.path().join("doc.txt")).unwrap();
        assert_eq!(status.state, DocumentState::InProgress);

        checkpoints.advance(&id, 9).unwrap();
        let status = document_status(&profile, &layout, &dir.path().join("doc.txt")).unwrap();
        assert_eq!(status.state, DocumentState::Ahead);
    }

    #[test]
    fn test_same_stem_document_stays_fresh() {
        let (dir, profile, layout) = setup();
        fs::write(dir.path().join("doc.md"), "b".repeat(35)).unwrap();
        let id = folio_domain::DocumentId::new("doc.txt");
        CsvTableSink::new(layout.clone())
            .ensure_initialized(&id, &folio_domain::CANONICAL_FIELDS)
            .unwrap();
        FileCheckpointStore::new(layout.clone()).advance(&id, 2).unwrap();

        let status = document_status(&profile, &layout, &dir.path().join("doc.md")).unwrap();
        assert_eq!(status.state, DocumentState::Fresh);
    }

    #[test]
    fn test_missing_source() {
        let (dir, profile, layout) = setup();
        assert!(document_status(&profile, &layout, &dir.path().join("nope.txt")).is_err());
    }
}
