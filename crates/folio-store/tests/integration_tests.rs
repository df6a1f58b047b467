//! Integration tests for folio-store
//!
//! These tests drive the checkpoint store and the table sink together the way
//! a document run does, including "process restarts" modeled as fresh store
//! instances over the same directories.

use folio_domain::traits::{CheckpointStore, RowSink};
use folio_domain::{BibliographicEntry, DocumentId, PartialRecord, CANONICAL_FIELDS};
use folio_store::{ArtifactLayout, CsvTableSink, FileCheckpointStore, StoreError};
use std::fs;
use tempfile::TempDir;

fn layout(dir: &TempDir) -> ArtifactLayout {
    ArtifactLayout::new(dir.path().join("output"), dir.path().join("data/progress"))
}

fn row(title: &str) -> BibliographicEntry {
    let mut partial = PartialRecord::new();
    partial.insert("title".to_string(), title.to_string());
    BibliographicEntry::from_partial(&partial)
}

#[test]
fn test_store_initialization_creates_directories() {
    let dir = TempDir::new().unwrap();
    let doc = DocumentId::new("briscoe_uAPI.txt");
    let mut checkpoints = FileCheckpointStore::new(layout(&dir));
    let mut sink = CsvTableSink::new(layout(&dir));

    sink.ensure_initialized(&doc, &CANONICAL_FIELDS).unwrap();
    checkpoints.advance(&doc, 0).unwrap();

    assert!(dir.path().join("output/briscoe_uAPI.txt.csv").is_file());
    assert!(dir.path().join("data/progress/briscoe_uAPI.txt.progress").is_file());
}

#[test]
fn test_same_stem_documents_keep_separate_tables() {
    let dir = TempDir::new().unwrap();
    let text = DocumentId::new("matthews.txt");
    let markdown = DocumentId::new("matthews.md");
    let mut checkpoints = FileCheckpointStore::new(layout(&dir));
    let mut sink = CsvTableSink::new(layout(&dir));

    sink.ensure_initialized(&text, &CANONICAL_FIELDS).unwrap();
    sink.append_rows(&text, &[row("First title")]).unwrap();
    checkpoints.advance(&text, 1).unwrap();

    assert!(!sink.exists(&markdown));
    assert_eq!(checkpoints.read(&markdown).unwrap(), 0);

    sink.ensure_initialized(&markdown, &CANONICAL_FIELDS).unwrap();
    sink.append_rows(&markdown, &[row("Second title")]).unwrap();

    assert_eq!(sink.row_count(&text).unwrap(), 1);
    assert_eq!(sink.row_count(&markdown).unwrap(), 1);
    let markdown_table = fs::read_to_string(sink.path_for(&markdown)).unwrap();
    assert!(markdown_table.starts_with(CANONICAL_FIELDS[0]));
    assert!(!markdown_table.contains("First title"));
}

#[test]
fn test_restart_sees_durable_state() {
    let dir = TempDir::new().unwrap();
    let doc = DocumentId::new("doc.txt");

    {
        let mut checkpoints = FileCheckpointStore::new(layout(&dir));
        let mut sink = CsvTableSink::new(layout(&dir));
        sink.ensure_initialized(&doc, &CANONICAL_FIELDS).unwrap();
        checkpoints.advance(&doc, 0).unwrap();

        sink.append_rows(&doc, &[row("First")]).unwrap();
        checkpoints.advance(&doc, 1).unwrap();
        sink.append_rows(&doc, &[row("Second")]).unwrap();
        checkpoints.advance(&doc, 2).unwrap();
    }

    // New instances, as after a process restart
    let checkpoints = FileCheckpointStore::new(layout(&dir));
    let mut sink = CsvTableSink::new(layout(&dir));
    assert_eq!(checkpoints.read(&doc).unwrap(), 2);

    // A resumed run never re-initializes an existing table
    sink.ensure_initialized(&doc, &CANONICAL_FIELDS).unwrap();
    assert_eq!(sink.row_count(&doc).unwrap(), 2);

    let content = fs::read_to_string(sink.path_for(&doc)).unwrap();
    let header_count = content
        .lines()
        .filter(|line| line.starts_with("author1_last_name,"))
        .count();
    assert_eq!(header_count, 1);
}

#[test]
fn test_documents_are_isolated() {
    let dir = TempDir::new().unwrap();
    let a = DocumentId::new("a.txt");
    let b = DocumentId::new("b.txt");
    let mut checkpoints = FileCheckpointStore::new(layout(&dir));
    let mut sink = CsvTableSink::new(layout(&dir));

    for doc in [&a, &b] {
        sink.ensure_initialized(doc, &CANONICAL_FIELDS).unwrap();
    }
    sink.append_rows(&a, &[row("A1"), row("A2")]).unwrap();
    checkpoints.advance(&a, 3).unwrap();

    assert_eq!(checkpoints.read(&b).unwrap(), 0);
    assert_eq!(sink.row_count(&b).unwrap(), 0);
    assert_eq!(sink.row_count(&a).unwrap(), 2);
}

#[test]
fn test_suffix_separates_artifacts_of_same_document() {
    let dir = TempDir::new().unwrap();
    let doc = DocumentId::new("matthews.txt");
    let mut plain = FileCheckpointStore::new(layout(&dir));
    let mut sanitized = FileCheckpointStore::new(layout(&dir).with_suffix("_sanitized"));

    plain.advance(&doc, 4).unwrap();
    sanitized.advance(&doc, 9).unwrap();

    assert_eq!(plain.read(&doc).unwrap(), 4);
    assert_eq!(sanitized.read(&doc).unwrap(), 9);
}

#[test]
fn test_corrupt_checkpoint_surfaces_on_advance() {
    let dir = TempDir::new().unwrap();
    let doc = DocumentId::new("doc.txt");
    let mut checkpoints = FileCheckpointStore::new(layout(&dir));
    let path = checkpoints.path_for(&doc);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "-1").unwrap();

    let result = checkpoints.advance(&doc, 1);
    assert!(matches!(result, Err(StoreError::CorruptCheckpoint { .. })));
}
