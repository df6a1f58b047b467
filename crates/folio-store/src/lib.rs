//! Folio Storage Layer
//!
//! File-backed implementations of the `CheckpointStore` and `RowSink` traits.
//!
//! # Architecture
//!
//! - One checkpoint file per document: a single textual integer, replaced atomically
//! - One CSV table per document: header written once, rows appended and synced
//! - [`ArtifactLayout`] maps a document identifier to both paths deterministically
//!
//! # Examples
//!
//! ```no_run
//! use folio_domain::traits::CheckpointStore;
//! use folio_domain::DocumentId;
//! use folio_store::{ArtifactLayout, FileCheckpointStore};
//!
//! let layout = ArtifactLayout::new("output", "data/progress");
//! let store = FileCheckpointStore::new(layout);
//! let cursor = store.read(&DocumentId::new("kaplan_uAPI.txt")).unwrap();
//! ```

#![warn(missing_docs)]

mod checkpoint;
mod layout;
mod table;

use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub use checkpoint::FileCheckpointStore;
pub use layout::ArtifactLayout;
pub use table::CsvTableSink;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Filesystem error on a specific artifact
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Artifact path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// CSV encoding error
    #[error("CSV error on {path}: {source}")]
    Csv {
        /// Table path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: csv::Error,
    },

    /// Checkpoint file does not hold a non-negative integer
    #[error("Corrupt checkpoint {path}: {content:?} is not a chunk index")]
    CorruptCheckpoint {
        /// Checkpoint path
        path: PathBuf,
        /// What the file actually contained
        content: String,
    },

    /// Cursor would move backwards
    #[error("Checkpoint for {document} cannot move from {current} back to {requested}")]
    Regression {
        /// Document identifier
        document: String,
        /// Stored cursor
        current: usize,
        /// Requested cursor
        requested: usize,
    },

    /// Appending to a table that was never initialized
    #[error("Output table {0} does not exist")]
    MissingTable(PathBuf),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}
