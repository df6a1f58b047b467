//! Extraction schema handed to the text-understanding capability

use crate::entry::CANONICAL_FIELDS;

/// What to extract and how.
///
/// `fields` is always the canonical list; `instructions`, `example` and
/// `preamble` vary per document source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionSchema {
    /// Field names the capability is asked to fill
    pub fields: Vec<String>,
    /// Source-specific extraction rules
    pub instructions: String,
    /// Optional worked example (input and expected JSON)
    pub example: Option<String>,
    /// Text placed before the chunk in the user message
    pub preamble: String,
}

impl ExtractionSchema {
    /// Schema over the canonical fields
    pub fn canonical(instructions: impl Into<String>) -> Self {
        Self {
            fields: CANONICAL_FIELDS.iter().map(|f| f.to_string()).collect(),
            instructions: instructions.into(),
            example: None,
            preamble: "Extract entries from this text:".to_string(),
        }
    }

    /// Attach a worked example
    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.example = Some(example.into());
        self
    }

    /// Replace the user-message preamble
    pub fn with_preamble(mut self, preamble: impl Into<String>) -> Self {
        self.preamble = preamble.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_schema_lists_all_fields() {
        let schema = ExtractionSchema::canonical("rules");
        assert_eq!(schema.fields.len(), CANONICAL_FIELDS.len());
        assert_eq!(schema.fields[0], "author1_last_name");
        assert!(schema.example.is_none());
    }

    #[test]
    fn test_builder_methods() {
        let schema = ExtractionSchema::canonical("rules")
            .with_example("Input: x")
            .with_preamble("Extract ALL entries:");
        assert_eq!(schema.example.as_deref(), Some("Input: x"));
        assert_eq!(schema.preamble, "Extract ALL entries:");
    }
}
