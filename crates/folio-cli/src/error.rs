//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pipeline error
    #[error(transparent)]
    Extractor(#[from] folio_extractor::ExtractorError),

    /// Checkpoint or table error
    #[error(transparent)]
    Store(#[from] folio_store::StoreError),

    /// LLM provider setup error
    #[error("LLM error: {0}")]
    Llm(#[from] folio_llm::LlmError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Some documents in a batch did not finish
    #[error("{failed} of {total} document(s) failed")]
    DocumentsFailed {
        /// Documents that stopped with an error
        failed: usize,
        /// Documents attempted
        total: usize,
    },
}
