//! Append-only CSV output tables

use crate::{ArtifactLayout, StoreError};
use folio_domain::traits::RowSink;
use folio_domain::{BibliographicEntry, DocumentId};
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// CSV table sink, one file per document.
///
/// The header is written only when the file is created. Rows are appended,
/// flushed and synced before `append_rows` returns. Nothing is ever rewritten.
#[derive(Debug, Clone)]
pub struct CsvTableSink {
    layout: ArtifactLayout,
}

impl CsvTableSink {
    /// Create a sink over `layout`'s output directory
    pub fn new(layout: ArtifactLayout) -> Self {
        Self { layout }
    }

    /// Table path for `document`
    pub fn path_for(&self, document: &DocumentId) -> PathBuf {
        self.layout.table_path(document)
    }

    /// Number of data rows currently in the table (header excluded)
    pub fn row_count(&self, document: &DocumentId) -> Result<usize, StoreError> {
        let path = self.path_for(document);
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&path)
            .map_err(|e| csv_error(&path, e))?;

        let mut count = 0;
        for record in reader.records() {
            record.map_err(|e| csv_error(&path, e))?;
            count += 1;
        }
        Ok(count)
    }

    /// Delete the table; a missing table is not an error
    pub fn remove(&mut self, document: &DocumentId) -> Result<(), StoreError> {
        let path = self.path_for(document);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }
}

impl RowSink for CsvTableSink {
    type Error = StoreError;

    fn exists(&self, document: &DocumentId) -> bool {
        self.path_for(document).is_file()
    }

    fn ensure_initialized(&mut self, document: &DocumentId, schema: &[&str]) -> Result<(), Self::Error> {
        let path = self.path_for(document);
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;
        }

        // create_new makes "header only if absent" a single filesystem decision
        let file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                debug!(path = %path.display(), "Output table already exists");
                return Ok(());
            }
            Err(e) => return Err(StoreError::io(path, e)),
        };

        let mut writer = csv::Writer::from_writer(file);
        writer.write_record(schema).map_err(|e| csv_error(&path, e))?;
        sync_writer(writer, &path)?;

        info!(path = %path.display(), "Created output table");
        Ok(())
    }

    fn append_rows(
        &mut self,
        document: &DocumentId,
        rows: &[BibliographicEntry],
    ) -> Result<(), Self::Error> {
        if rows.is_empty() {
            return Ok(());
        }

        let path = self.path_for(document);
        let file = match OpenOptions::new().append(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::MissingTable(path));
            }
            Err(e) => return Err(StoreError::io(path, e)),
        };

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        for row in rows {
            writer
                .write_record(row.values())
                .map_err(|e| csv_error(&path, e))?;
        }
        sync_writer(writer, &path)?;

        debug!(path = %path.display(), rows = rows.len(), "Appended rows");
        Ok(())
    }
}

fn sync_writer(writer: csv::Writer<File>, path: &Path) -> Result<(), StoreError> {
    let mut file = writer
        .into_inner()
        .map_err(|e| StoreError::io(path, e.into_error()))?;
    file.flush().map_err(|e| StoreError::io(path, e))?;
    file.sync_data().map_err(|e| StoreError::io(path, e))
}

fn csv_error(path: &Path, source: csv::Error) -> StoreError {
    StoreError::Csv {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_domain::{PartialRecord, CANONICAL_FIELDS};
    use tempfile::TempDir;

    fn sink(dir: &TempDir) -> CsvTableSink {
        CsvTableSink::new(ArtifactLayout::new(
            dir.path().join("output"),
            dir.path().join("progress"),
        ))
    }

    fn entry(last: &str, title: &str) -> BibliographicEntry {
        let mut partial = PartialRecord::new();
        partial.insert("author1_last_name".to_string(), last.to_string());
        partial.insert("title".to_string(), title.to_string());
        BibliographicEntry::from_partial(&partial)
    }

    #[test]
    fn test_header_written_once() {
        let dir = TempDir::new().unwrap();
        let mut sink = sink(&dir);
        let doc = DocumentId::new("doc.txt");

        sink.ensure_initialized(&doc, &CANONICAL_FIELDS).unwrap();
        sink.ensure_initialized(&doc, &CANONICAL_FIELDS).unwrap();

        let content = fs::read_to_string(sink.path_for(&doc)).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.starts_with("author1_last_name,author1_first_name,"));
        assert_eq!(sink.row_count(&doc).unwrap(), 0);
    }

    #[test]
    fn test_append_preserves_existing_rows() {
        let dir = TempDir::new().unwrap();
        let mut sink = sink(&dir);
        let doc = DocumentId::new("doc.txt");

        sink.ensure_initialized(&doc, &CANONICAL_FIELDS).unwrap();
        sink.append_rows(&doc, &[entry("Smith", "Title X")]).unwrap();
        sink.append_rows(&doc, &[entry("Doe", "Title Y"), entry("Roe", "Title Z")])
            .unwrap();

        assert_eq!(sink.row_count(&doc).unwrap(), 3);
        let content = fs::read_to_string(sink.path_for(&doc)).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert!(lines[1].starts_with("Smith,N/A,"));
        assert!(lines[3].starts_with("Roe,N/A,"));
    }

    #[test]
    fn test_values_with_commas_are_quoted() {
        let dir = TempDir::new().unwrap();
        let mut sink = sink(&dir);
        let doc = DocumentId::new("doc.txt");

        sink.ensure_initialized(&doc, &CANONICAL_FIELDS).unwrap();
        sink.append_rows(&doc, &[entry("Little, Brown", "Watching the world go by")])
            .unwrap();

        let mut reader = csv::Reader::from_path(sink.path_for(&doc)).unwrap();
        let record = reader.records().next().unwrap().unwrap();
        assert_eq!(&record[0], "Little, Brown");
        assert_eq!(record.len(), CANONICAL_FIELDS.len());
    }

    #[test]
    fn test_append_without_table_fails() {
        let dir = TempDir::new().unwrap();
        let mut sink = sink(&dir);
        let doc = DocumentId::new("doc.txt");

        let result = sink.append_rows(&doc, &[entry("Smith", "Title X")]);
        assert!(matches!(result, Err(StoreError::MissingTable(_))));
        assert!(!sink.exists(&doc));
    }

    #[test]
    fn test_append_nothing_is_a_no_op() {
        let dir = TempDir::new().unwrap();
        let mut sink = sink(&dir);
        let doc = DocumentId::new("doc.txt");

        // No table, but nothing to write either
        sink.append_rows(&doc, &[]).unwrap();
        assert!(!sink.exists(&doc));
    }

    #[test]
    fn test_remove_table() {
        let dir = TempDir::new().unwrap();
        let mut sink = sink(&dir);
        let doc = DocumentId::new("doc.txt");

        sink.ensure_initialized(&doc, &CANONICAL_FIELDS).unwrap();
        sink.remove(&doc).unwrap();
        assert!(!sink.exists(&doc));
        sink.remove(&doc).unwrap();
    }
}
