//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the pipeline and infrastructure.
//! Infrastructure implementations live in other crates.

use std::future::Future;
use std::time::Duration;

use crate::{BibliographicEntry, DocumentId, ExtractionSchema, PartialRecord};

/// A single request to a text-understanding engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    /// System / instruction message
    pub system: String,
    /// User message carrying the chunk text
    pub user: String,
    /// Ask the engine to answer with a single JSON object
    pub json_mode: bool,
}

/// Trait for LLM provider operations
///
/// Implemented by the infrastructure layer (folio-llm)
pub trait LlmProvider {
    /// Error type for LLM operations
    type Error;

    /// Run one completion and return the raw response text
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send;

    /// Model identifier used for diagnostics
    fn model_name(&self) -> &str;

    /// Longest a single `complete` call can take, retries and backoff included.
    ///
    /// `None` when the provider has no internal deadline.
    fn call_budget(&self) -> Option<Duration> {
        None
    }
}

/// Trait for extracting partial records from one chunk of text
///
/// Implementations are fail-soft: every internal failure is converted to an
/// empty list. Implemented by the application layer (folio-extractor).
pub trait EntryExtractor {
    /// Extract zero or more partial records from `text`
    fn extract(
        &self,
        text: &str,
        schema: &ExtractionSchema,
    ) -> impl Future<Output = Vec<PartialRecord>> + Send;
}

/// Trait for the durable per-document resume cursor
///
/// Implemented by the infrastructure layer (folio-store)
pub trait CheckpointStore {
    /// Error type for checkpoint operations
    type Error;

    /// Index of the next chunk to process, 0 if nothing is stored
    fn read(&self, document: &DocumentId) -> Result<usize, Self::Error>;

    /// Durably record `next_cursor`; must be visible before returning
    fn advance(&mut self, document: &DocumentId, next_cursor: usize) -> Result<(), Self::Error>;

    /// Forget the stored cursor
    fn clear(&mut self, document: &DocumentId) -> Result<(), Self::Error>;
}

/// Trait for the append-only output table
///
/// Implemented by the infrastructure layer (folio-store)
pub trait RowSink {
    /// Error type for table operations
    type Error;

    /// Whether the table for `document` exists
    fn exists(&self, document: &DocumentId) -> bool;

    /// Create the table with a header row if and only if it does not exist yet
    fn ensure_initialized(&mut self, document: &DocumentId, schema: &[&str]) -> Result<(), Self::Error>;

    /// Durably append rows after any existing ones; never rewrites the header
    fn append_rows(
        &mut self,
        document: &DocumentId,
        rows: &[BibliographicEntry],
    ) -> Result<(), Self::Error>;
}
