//! Folio Extractor
//!
//! Turns long, noisy bibliography text into rows of a fixed 23-field table by
//! sending one chunk at a time to an LLM, with a durable checkpoint so an
//! interrupted run resumes where it stopped.
//!
//! # Architecture
//!
//! ```text
//! bytes → TextSanitizer → TextChunker → LlmExtractionAdapter → normalize_records
//!                                              ↓
//!                          RowSink::append_rows → CheckpointStore::advance
//! ```
//!
//! # Key Features
//!
//! - **Sanitization**: NFKC, control/format character removal, per-source noise patterns
//! - **Segmentation**: page windows, record-boundary spans, or fixed character windows
//! - **Fail-soft extraction**: a failed chunk yields zero rows and the run moves on
//! - **Resumability**: rows are appended before the cursor advances, never after
//! - **Source profiles**: built-in presets plus TOML-defined profiles
//!
//! # Example Usage
//!
//! ```no_run
//! use folio_extractor::{Pipeline, SourceProfile};
//! use folio_llm::OpenAiProvider;
//! use folio_store::{ArtifactLayout, CsvTableSink, FileCheckpointStore};
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let profile = SourceProfile::builtin("kaplan").unwrap();
//! let layout = ArtifactLayout::new("output", "data/progress");
//! let provider = OpenAiProvider::from_env("OPENAI_API_KEY", "gpt-4o-mini")?;
//!
//! let mut pipeline = Pipeline::with_provider(
//!     provider,
//!     FileCheckpointStore::new(layout.clone()),
//!     CsvTableSink::new(layout),
//!     &profile,
//! )?;
//!
//! let report = pipeline.run_path(Path::new("data/kaplan_uAPI.txt")).await?;
//! println!("{} rows from {} chunks", report.rows_appended, report.chunks_processed);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod adapter;
mod chunking;
mod config;
mod error;
mod normalizer;
mod parser;
mod pipeline;
mod prompt;
mod sanitizer;


pub use adapter::LlmExtractionAdapter;
pub use chunking::{payload, TextChunker};
pub use config::{ChunkStrategy, SourceProfile, TruncateRule, BUILTIN_PROFILES};
pub use error::ExtractorError;
pub use normalizer::normalize_records;
pub use parser::parse_llm_response;
pub use pipeline::{
    load_source, DocumentState, DocumentStatus, Pipeline, RunOutcome, RunReport,
};
pub use prompt::PromptBuilder;
pub use sanitizer::{TextSanitizer, PAGE_SEPARATOR};
