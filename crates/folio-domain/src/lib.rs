//! Folio Domain Layer
//!
//! Core model and trait seams for turning long, noisy bibliography text into
//! fixed-schema tabular records. This crate has no external dependencies; every
//! piece of infrastructure (LLM transport, checkpoint files, CSV tables) lives in
//! another crate and plugs in through the traits in [`traits`].
//!
//! ## Key Concepts
//!
//! - **Document**: a source text and the identifier derived from its file name
//! - **Chunk**: one contiguous span of a document submitted as a single extraction unit
//! - **Checkpoint**: the durable index of the next chunk to process
//! - **BibliographicEntry**: a record with exactly 23 canonical fields, sentinel-filled
//! - **ExtractionSchema**: field list plus instructions handed to the extraction capability

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod entry;
pub mod schema;
pub mod traits;

// Re-exports for convenience
pub use document::{Chunk, ChunkKind, Document, DocumentId};
pub use entry::{BibliographicEntry, PartialRecord, CANONICAL_FIELDS, FIELD_COUNT, SENTINEL};
pub use schema::ExtractionSchema;
pub use traits::CompletionRequest;
