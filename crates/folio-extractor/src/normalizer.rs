//! Conformance of partial records to the canonical schema

use folio_domain::{BibliographicEntry, PartialRecord, CANONICAL_FIELDS};
use tracing::debug;

/// Map partial records onto the canonical 23-field schema.
///
/// Total: every input produces exactly one entry, in input order. Missing and
/// blank fields become the sentinel; unrecognized keys are dropped.
pub fn normalize_records(partials: &[PartialRecord]) -> Vec<BibliographicEntry> {
    partials
        .iter()
        .map(|partial| {
            let mut unknown: Vec<&str> = partial
                .keys()
                .map(String::as_str)
                .filter(|key| !CANONICAL_FIELDS.contains(key))
                .collect();
            if !unknown.is_empty() {
                unknown.sort_unstable();
                debug!(fields = ?unknown, "Dropping unrecognized fields");
            }
            BibliographicEntry::from_partial(partial)
        })
        .collect()
}
