//! Resumable per-document extraction run

use crate::adapter::LlmExtractionAdapter;
use crate::chunking::{payload, TextChunker};
use crate::config::SourceProfile;
use crate::error::ExtractorError;
use crate::normalizer::normalize_records;
use crate::sanitizer::TextSanitizer;
use folio_domain::traits::{CheckpointStore, EntryExtractor, LlmProvider, RowSink};
use folio_domain::{Chunk, Document, DocumentId, ExtractionSchema, CANONICAL_FIELDS};
use folio_store::StoreError;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Characters of chunk text shown in debug output
const PREVIEW_CHARS: usize = 100;

/// Where a document stands relative to its current segmentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentState {
    /// No table and no progress
    Fresh,
    /// Some chunks remain
    InProgress,
    /// Every chunk has been processed
    Complete,
    /// The stored cursor is past the last chunk (source or profile changed)
    Ahead,
}

impl DocumentState {
    /// Classify a stored cursor against the chunk count
    pub fn classify(cursor: usize, chunk_count: usize, table_exists: bool) -> Self {
        if cursor > chunk_count {
            DocumentState::Ahead
        } else if cursor == 0 && !table_exists {
            DocumentState::Fresh
        } else if cursor == chunk_count {
            DocumentState::Complete
        } else {
            DocumentState::InProgress
        }
    }
}

impl fmt::Display for DocumentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DocumentState::Fresh => "fresh",
            DocumentState::InProgress => "in-progress",
            DocumentState::Complete => "complete",
            DocumentState::Ahead => "ahead",
        };
        f.write_str(label)
    }
}

/// Snapshot of a document's progress
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentStatus {
    /// Document identifier
    pub document: DocumentId,
    /// Chunks under the current profile
    pub chunk_count: usize,
    /// Stored cursor
    pub cursor: usize,
    /// Derived state
    pub state: DocumentState,
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Chunks were processed up to the end of the document
    Completed,
    /// The checkpoint already covered every chunk; nothing was done
    AlreadyComplete,
}

/// Summary of one document run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Document identifier
    pub document: DocumentId,
    /// Chunks under the current profile
    pub chunk_count: usize,
    /// Cursor found at the start of the run
    pub start_cursor: usize,
    /// Chunks handled in this run, blank ones included
    pub chunks_processed: usize,
    /// Page windows skipped for lack of content
    pub blank_skipped: usize,
    /// Chunks that went to extraction and produced no entries
    pub empty_chunks: usize,
    /// Rows appended to the output table
    pub rows_appended: usize,
    /// Appended rows in which every field is the sentinel
    pub rows_without_data: usize,
    /// How the run ended
    pub outcome: RunOutcome,
}

/// Sanitize, segment, extract and persist one document at a time.
///
/// Per chunk the order is always: extract, append rows, advance the
/// checkpoint. A crash between the append and the advance leaves that
/// chunk's rows in the table with the cursor still pointing at it, so the
/// chunk is processed again on restart (at-least-once).
pub struct Pipeline<X, C, S> {
    extractor: X,
    checkpoints: C,
    sink: S,
    sanitizer: TextSanitizer,
    chunker: TextChunker,
    schema: ExtractionSchema,
}

impl<P, C, S> Pipeline<LlmExtractionAdapter<P>, C, S>
where
    P: LlmProvider + Sync,
    P::Error: fmt::Display,
    C: CheckpointStore<Error = StoreError>,
    S: RowSink<Error = StoreError>,
{
    /// Pipeline over an LLM provider, using the profile's extraction timeout
    pub fn with_provider(
        provider: P,
        checkpoints: C,
        sink: S,
        profile: &SourceProfile,
    ) -> Result<Self, ExtractorError> {
        let adapter = LlmExtractionAdapter::new(provider, profile.extraction_timeout());
        Self::new(adapter, checkpoints, sink, profile)
    }
}

impl<X, C, S> Pipeline<X, C, S>
where
    X: EntryExtractor,
    C: CheckpointStore<Error = StoreError>,
    S: RowSink<Error = StoreError>,
{
    /// Create a pipeline configured by `profile`
    pub fn new(
        extractor: X,
        checkpoints: C,
        sink: S,
        profile: &SourceProfile,
    ) -> Result<Self, ExtractorError> {
        profile.validate().map_err(ExtractorError::Config)?;

        Ok(Self {
            extractor,
            checkpoints,
            sink,
            sanitizer: TextSanitizer::from_profile(profile)?,
            chunker: TextChunker::new(&profile.chunk_strategy)?,
            schema: profile.schema(),
        })
    }

    /// Sanitize raw bytes and segment the result
    pub fn prepare(&self, id: DocumentId, raw: &[u8]) -> (Document, Vec<Chunk>) {
        let document = Document::new(id, self.sanitizer.sanitize_bytes(raw));
        let chunks = self.chunker.chunk(document.text());
        (document, chunks)
    }

    /// Current progress of a document
    pub fn status(&self, id: DocumentId, raw: &[u8]) -> Result<DocumentStatus, ExtractorError> {
        let (document, chunks) = self.prepare(id, raw);
        let cursor = self.checkpoints.read(document.id())?;
        let state = DocumentState::classify(cursor, chunks.len(), self.sink.exists(document.id()));

        Ok(DocumentStatus {
            document: document.id().clone(),
            chunk_count: chunks.len(),
            cursor,
            state,
        })
    }

    /// Process a document from its stored cursor to the end
    pub async fn run(&mut self, id: DocumentId, raw: &[u8]) -> Result<RunReport, ExtractorError> {
        let (document, chunks) = self.prepare(id, raw);
        let id = document.id();
        let chunk_count = chunks.len();

        info!(
            document = %id,
            chars = document.text().chars().count(),
            chunks = chunk_count,
            "Document segmented"
        );

        let start_cursor = self.checkpoints.read(id)?;
        if start_cursor > chunk_count {
            return Err(ExtractorError::CheckpointAhead {
                document: id.to_string(),
                cursor: start_cursor,
                chunk_count,
            });
        }

        if start_cursor == 0 {
            self.sink.ensure_initialized(id, &CANONICAL_FIELDS)?;
            self.checkpoints.advance(id, 0)?;
        } else if !self.sink.exists(id) {
            return Err(ExtractorError::MissingTable {
                document: id.to_string(),
                cursor: start_cursor,
            });
        } else if start_cursor < chunk_count {
            info!(document = %id, "Resuming from chunk {}/{}", start_cursor + 1, chunk_count);
        }

        let mut report = RunReport {
            document: id.clone(),
            chunk_count,
            start_cursor,
            chunks_processed: 0,
            blank_skipped: 0,
            empty_chunks: 0,
            rows_appended: 0,
            rows_without_data: 0,
            outcome: RunOutcome::Completed,
        };

        if start_cursor == chunk_count && chunk_count > 0 {
            warn!(
                document = %id,
                chunks = chunk_count,
                "Document already complete; reset it to process it again"
            );
            report.outcome = RunOutcome::AlreadyComplete;
            return Ok(report);
        }

        for chunk in &chunks[start_cursor..] {
            let position = chunk.index + 1;

            if chunk.blank {
                debug!("Skipping blank chunk {}/{}", position, chunk_count);
                report.blank_skipped += 1;
            } else {
                info!("Processing chunk {}/{}", position, chunk_count);
                debug!(
                    chars = chunk.char_len(),
                    preview = %chunk.preview(PREVIEW_CHARS),
                    "Chunk content"
                );

                let partials = self.extractor.extract(&payload(chunk), &self.schema).await;
                let rows = normalize_records(&partials);
                self.sink.append_rows(id, &rows)?;

                if rows.is_empty() {
                    report.empty_chunks += 1;
                }
                report.rows_appended += rows.len();
                report.rows_without_data +=
                    rows.iter().filter(|r| r.populated_count() == 0).count();
                info!("Chunk {}/{}: {} entries", position, chunk_count, rows.len());
            }

            self.checkpoints.advance(id, position)?;
            report.chunks_processed += 1;
        }

        info!(
            document = %id,
            rows = report.rows_appended,
            chunks = report.chunks_processed,
            "Document complete"
        );
        Ok(report)
    }

    /// Read a source file and run it
    pub async fn run_path(&mut self, path: &Path) -> Result<RunReport, ExtractorError> {
        let (id, raw) = load_source(path)?;
        self.run(id, &raw).await
    }

    /// The extractor
    pub fn extractor(&self) -> &X {
        &self.extractor
    }

    /// The checkpoint store
    pub fn checkpoints(&self) -> &C {
        &self.checkpoints
    }

    /// The output sink
    pub fn sink(&self) -> &S {
        &self.sink
    }
}

/// Read a source document and derive its identifier from the file name
pub fn load_source(path: &Path) -> Result<(DocumentId, Vec<u8>), ExtractorError> {
    let id = DocumentId::from_path(path).ok_or_else(|| {
        ExtractorError::Config(format!("{} has no file name", path.display()))
    })?;
    let raw = fs::read(path).map_err(|source| ExtractorError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok((id, raw))
}
