//! Bibliographic entries and the canonical output schema

use std::collections::HashMap;
use std::fmt;

/// Number of canonical fields in every output row
pub const FIELD_COUNT: usize = 23;

/// Placeholder written for any canonical field the extraction did not populate
pub const SENTINEL: &str = "N/A";

/// Canonical field names, in output column order
pub const CANONICAL_FIELDS: [&str; FIELD_COUNT] = [
    "author1_last_name",
    "author1_first_name",
    "author2_last_name",
    "author2_first_name",
    "editor1_last_name",
    "editor1_first_name",
    "title",
    "original_date_of_publication",
    "second_or_later_date_of_publication",
    "volume",
    "publisher",
    "publisher_location",
    "number_of_pages",
    "dictation",
    "name_of_transcriber",
    "translation",
    "name_of_translator",
    "summary",
    "occupations",
    "date_of_birth",
    "date_of_death",
    "place_of_birth",
    "other_places_lived",
];

/// An untyped record as returned by the extraction capability.
///
/// Keys are whatever the capability produced; nothing guarantees they match
/// [`CANONICAL_FIELDS`].
pub type PartialRecord = HashMap<String, String>;

/// A fully populated output row.
///
/// Holds exactly one non-empty value per canonical field, in canonical order.
/// The only way to build one is [`BibliographicEntry::from_partial`], which is
/// total: missing or blank values become [`SENTINEL`] and unknown keys are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BibliographicEntry {
    values: [String; FIELD_COUNT],
}

impl BibliographicEntry {
    /// Normalize a partial record into a full canonical entry
    pub fn from_partial(partial: &PartialRecord) -> Self {
        let values = CANONICAL_FIELDS.map(|field| {
            partial
                .get(field)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .unwrap_or(SENTINEL)
                .to_string()
        });
        Self { values }
    }

    /// Value of a canonical field, or `None` if `field` is not canonical
    pub fn get(&self, field: &str) -> Option<&str> {
        CANONICAL_FIELDS
            .iter()
            .position(|f| *f == field)
            .map(|idx| self.values[idx].as_str())
    }

    /// Values in canonical column order
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Number of fields that hold real data rather than the sentinel
    pub fn populated_count(&self) -> usize {
        self.values.iter().filter(|v| v.as_str() != SENTINEL).count()
    }
}

impl fmt::Display for BibliographicEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}: {}",
            self.values[0], self.values[1], self.values[6]
        )
    }
}
