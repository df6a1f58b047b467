//! Documents and chunks

use std::fmt;
use std::ops::Range;
use std::path::Path;

/// Identity of a source document, derived from its file name.
///
/// Two documents with the same file name share checkpoint and output artifacts,
/// so the identifier keeps the full file name (extension included).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(String);

impl DocumentId {
    /// Create an identifier from a raw file name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Derive the identifier from a path's final component
    pub fn from_path(path: &Path) -> Option<Self> {
        path.file_name()
            .and_then(|name| name.to_str())
            .filter(|name| !name.is_empty())
            .map(Self::new)
    }

    /// Full file name, e.g. `kaplan_uAPI.txt`
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A sanitized source document. Immutable once built.
#[derive(Debug, Clone)]
pub struct Document {
    id: DocumentId,
    text: String,
}

impl Document {
    /// Wrap already-sanitized text
    pub fn new(id: DocumentId, text: String) -> Self {
        Self { id, text }
    }

    /// Document identifier
    pub fn id(&self) -> &DocumentId {
        &self.id
    }

    /// Full sanitized text
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// How a chunk's edges were chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkKind {
    /// A window of whole OCR pages
    PageWindow,
    /// A span cut at record-start boundaries
    Semantic,
    /// A fixed-size character window
    CharWindow,
}

/// One extraction unit.
///
/// `span` is a byte range into the sanitized document text. The spans of a
/// document's chunks are contiguous, start at 0, and end at the text length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// 0-based position in the chunk sequence
    pub index: usize,
    /// Byte range into the document text
    pub span: Range<usize>,
    /// Text covered by `span`
    pub text: String,
    /// Boundary type
    pub kind: ChunkKind,
    /// Too little content to be worth an extraction call
    pub blank: bool,
}

impl Chunk {
    /// Number of characters (not bytes) in the chunk
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Leading characters of the chunk, for progress output
    pub fn preview(&self, max_chars: usize) -> String {
        self.text.chars().take(max_chars).collect()
    }
}
