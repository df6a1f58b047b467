//! Text sanitization ahead of segmentation

use crate::config::{SourceProfile, TruncateRule};
use crate::ExtractorError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;
use tracing::{debug, warn};
use unicode_normalization::UnicodeNormalization;
use unicode_properties::{GeneralCategory, UnicodeGeneralCategory};

/// Page separator emitted by OCR tools between pages
pub const PAGE_SEPARATOR: char = '\u{000C}';

/// Cleans raw document text so it can be chunked and embedded in a request.
///
/// Steps, in order: line endings to `\n`, removal of control and invisible
/// format characters (`\n` and `\t` survive, and the page separator survives
/// when page windows are used), NFKC normalization, noise patterns, then the
/// optional tail truncation. The output is always valid UTF-8 with no
/// characters a JSON encoder would reject.
#[derive(Debug, Clone)]
pub struct TextSanitizer {
    keep_page_separator: bool,
    noise: Vec<Regex>,
    truncate: Option<TruncateRule>,
}

impl TextSanitizer {
    /// Sanitizer with no noise patterns and no truncation
    pub fn new(keep_page_separator: bool) -> Self {
        Self {
            keep_page_separator,
            noise: Vec::new(),
            truncate: None,
        }
    }

    /// Sanitizer configured from a source profile
    pub fn from_profile(profile: &SourceProfile) -> Result<Self, ExtractorError> {
        let sanitizer = Self::new(profile.keeps_page_separator())
            .with_noise_patterns(&profile.noise_patterns)?;
        Ok(match &profile.truncate {
            Some(rule) => sanitizer.with_truncation(rule.clone()),
            None => sanitizer,
        })
    }

    /// Add noise patterns, removed in the given order
    pub fn with_noise_patterns(mut self, patterns: &[String]) -> Result<Self, ExtractorError> {
        for pattern in patterns {
            let regex = Regex::new(pattern).map_err(|e| {
                ExtractorError::Config(format!("invalid noise pattern {:?}: {}", pattern, e))
            })?;
            self.noise.push(regex);
        }
        Ok(self)
    }

    /// Set the tail truncation rule
    pub fn with_truncation(mut self, rule: TruncateRule) -> Self {
        self.truncate = Some(rule);
        self
    }

    /// Decode raw bytes (invalid UTF-8 is replaced with U+FFFD) and sanitize
    pub fn sanitize_bytes(&self, raw: &[u8]) -> String {
        let decoded = String::from_utf8_lossy(raw);
        if let Cow::Owned(text) = &decoded {
            let replaced = text.chars().filter(|c| *c == char::REPLACEMENT_CHARACTER).count();
            warn!(replaced, "Source contained invalid UTF-8; replaced undecodable bytes");
        }
        self.sanitize(&decoded)
    }

    /// Sanitize already-decoded text
    pub fn sanitize(&self, text: &str) -> String {
        static LINE_ENDINGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r\n?").unwrap());

        let unified = LINE_ENDINGS.replace_all(text, "\n");
        let kept: String = unified.chars().filter(|c| self.keeps(*c)).collect();
        let mut cleaned: String = kept.nfkc().collect();

        for regex in &self.noise {
            if let Cow::Owned(stripped) = regex.replace_all(&cleaned, "") {
                cleaned = stripped;
            }
        }

        if let Some(rule) = &self.truncate {
            if let Some(offset) = cleaned.rfind(&rule.marker) {
                if offset > rule.min_offset {
                    debug!(offset, marker = %rule.marker.trim(), "Truncating trailing material");
                    cleaned.truncate(offset);
                }
            }
        }

        cleaned
    }

    fn keeps(&self, c: char) -> bool {
        match c {
            '\n' | '\t' => true,
            PAGE_SEPARATOR => self.keep_page_separator,
            c if c.is_control() => false,
            c => !is_format_char(c),
        }
    }
}

impl Default for TextSanitizer {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Invisible format characters (general category Cf): zero-width spaces and
/// joiners, bidi controls, byte order marks, soft hyphens, tag characters
fn is_format_char(c: char) -> bool {
    c.general_category() == GeneralCategory::Format
}
