//! Text chunking strategies for large documents

use crate::config::ChunkStrategy;
use crate::sanitizer::PAGE_SEPARATOR;
use crate::ExtractorError;
use folio_domain::{Chunk, ChunkKind};
use regex::Regex;
use std::borrow::Cow;
use std::ops::Range;

/// Splits sanitized text into an ordered, gap-free sequence of chunks.
///
/// For every strategy the chunk spans start at 0, are contiguous, and end at
/// the text length, so concatenating the chunk texts reproduces the input.
/// Empty text yields no chunks. The same text and strategy always produce the
/// same chunks, which is what makes a stored cursor meaningful across runs.
#[derive(Debug, Clone)]
pub struct TextChunker {
    strategy: Strategy,
}

#[derive(Debug, Clone)]
enum Strategy {
    PageWindow {
        pages_per_chunk: usize,
        min_content_chars: usize,
    },
    Semantic {
        boundary: Regex,
        target_chars: usize,
    },
    CharWindow {
        max_chars: usize,
    },
}

impl TextChunker {
    /// Create a chunker for `strategy`
    pub fn new(strategy: &ChunkStrategy) -> Result<Self, ExtractorError> {
        match strategy {
            ChunkStrategy::PageWindow {
                pages_per_chunk,
                min_content_chars,
            } => Self::page_window(*pages_per_chunk, *min_content_chars),
            ChunkStrategy::SemanticBoundary {
                pattern,
                target_chars,
            } => Self::semantic(pattern, *target_chars),
            ChunkStrategy::CharWindow { max_chars } => Self::char_window(*max_chars),
        }
    }

    /// Windows of `pages_per_chunk` pages
    pub fn page_window(pages_per_chunk: usize, min_content_chars: usize) -> Result<Self, ExtractorError> {
        if pages_per_chunk == 0 {
            return Err(ExtractorError::Config("pages_per_chunk must be greater than 0".to_string()));
        }
        Ok(Self {
            strategy: Strategy::PageWindow {
                pages_per_chunk,
                min_content_chars,
            },
        })
    }

    /// Chunks cut at starts of `pattern` matches once `target_chars` is exceeded
    pub fn semantic(pattern: &str, target_chars: usize) -> Result<Self, ExtractorError> {
        if target_chars == 0 {
            return Err(ExtractorError::Config("target_chars must be greater than 0".to_string()));
        }
        let boundary = Regex::new(pattern).map_err(|e| {
            ExtractorError::Config(format!("invalid boundary pattern {:?}: {}", pattern, e))
        })?;
        Ok(Self {
            strategy: Strategy::Semantic {
                boundary,
                target_chars,
            },
        })
    }

    /// Fixed windows of `max_chars` characters
    pub fn char_window(max_chars: usize) -> Result<Self, ExtractorError> {
        if max_chars == 0 {
            return Err(ExtractorError::Config("max_chars must be greater than 0".to_string()));
        }
        Ok(Self {
            strategy: Strategy::CharWindow { max_chars },
        })
    }

    /// Chunk the given text
    pub fn chunk(&self, text: &str) -> Vec<Chunk> {
        if text.is_empty() {
            return Vec::new();
        }

        match &self.strategy {
            Strategy::PageWindow {
                pages_per_chunk,
                min_content_chars,
            } => page_spans(text, *pages_per_chunk)
                .into_iter()
                .enumerate()
                .map(|(index, span)| {
                    let blank = text[span.clone()].trim().chars().count() < *min_content_chars;
                    make_chunk(text, index, span, ChunkKind::PageWindow, blank)
                })
                .collect(),
            Strategy::Semantic {
                boundary,
                target_chars,
            } => semantic_spans(text, boundary, *target_chars)
                .into_iter()
                .enumerate()
                .map(|(index, span)| make_chunk(text, index, span, ChunkKind::Semantic, false))
                .collect(),
            Strategy::CharWindow { max_chars } => char_spans(text, *max_chars)
                .into_iter()
                .enumerate()
                .map(|(index, span)| make_chunk(text, index, span, ChunkKind::CharWindow, false))
                .collect(),
        }
    }

    /// Byte offsets where the boundary pattern matches (empty for other strategies)
    pub fn boundaries(&self, text: &str) -> Vec<usize> {
        match &self.strategy {
            Strategy::Semantic { boundary, .. } => {
                boundary.find_iter(text).map(|m| m.start()).collect()
            }
            _ => Vec::new(),
        }
    }
}

/// Text sent for extraction: page separators become newlines
pub fn payload(chunk: &Chunk) -> Cow<'_, str> {
    if chunk.kind == ChunkKind::PageWindow && chunk.text.contains(PAGE_SEPARATOR) {
        Cow::Owned(chunk.text.replace(PAGE_SEPARATOR, "\n"))
    } else {
        Cow::Borrowed(chunk.text.as_str())
    }
}

fn make_chunk(text: &str, index: usize, span: Range<usize>, kind: ChunkKind, blank: bool) -> Chunk {
    Chunk {
        index,
        text: text[span.clone()].to_string(),
        span,
        kind,
        blank,
    }
}

/// Each page ends just after its separator; the last page may have none
fn page_spans(text: &str, pages_per_chunk: usize) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut start = 0;
    let mut pages = 0;

    for (offset, _) in text.match_indices(PAGE_SEPARATOR) {
        pages += 1;
        if pages == pages_per_chunk {
            let end = offset + PAGE_SEPARATOR.len_utf8();
            spans.push(start..end);
            start = end;
            pages = 0;
        }
    }
    if start < text.len() {
        spans.push(start..text.len());
    }
    spans
}

/// Cut at a boundary once the current chunk already exceeds the target.
/// A single record longer than the target stays whole.
fn semantic_spans(text: &str, boundary: &Regex, target_chars: usize) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut start = 0;
    let mut counted_to = 0;
    let mut chars_since_start = 0;

    for m in boundary.find_iter(text) {
        let at = m.start();
        chars_since_start += text[counted_to..at].chars().count();
        counted_to = at;

        if at > start && chars_since_start > target_chars {
            spans.push(start..at);
            start = at;
            chars_since_start = 0;
        }
    }
    if start < text.len() {
        spans.push(start..text.len());
    }
    spans
}

fn char_spans(text: &str, max_chars: usize) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut start = 0;

    for (count, (offset, _)) in text.char_indices().enumerate() {
        if count > 0 && count % max_chars == 0 {
            spans.push(start..offset);
            start = offset;
        }
    }
    spans.push(start..text.len());
    spans
}
