//! Error types for the extraction pipeline

use folio_store::StoreError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during extraction
///
/// Only the pipeline-level variants ever leave a document run. The
/// per-chunk variants (`Llm`, `Timeout`, `InvalidFormat`, `JsonParse`) are
/// absorbed by the extraction adapter and logged.
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Checkpoint or output table failure
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Failed to read a source document
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Source document path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Extraction timeout
    #[error("Extraction timeout after {0}s")]
    Timeout(u64),

    /// Response did not have the expected shape
    #[error("Invalid response format: {0}")]
    InvalidFormat(String),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A run was resumed but the document's output table is gone
    #[error("Output table for {document} is missing but its checkpoint is at chunk {cursor}")]
    MissingTable {
        /// Document identifier
        document: String,
        /// Stored cursor
        cursor: usize,
    },

    /// The stored cursor points past the last chunk
    #[error(
        "Checkpoint for {document} is at chunk {cursor} but the document has only {chunk_count} chunks; \
         the source or profile changed, reset the document to reprocess it"
    )]
    CheckpointAhead {
        /// Document identifier
        document: String,
        /// Stored cursor
        cursor: usize,
        /// Chunks produced by the current segmentation
        chunk_count: usize,
    },
}

impl From<serde_json::Error> for ExtractorError {
    fn from(e: serde_json::Error) -> Self {
        ExtractorError::JsonParse(e.to_string())
    }
}
