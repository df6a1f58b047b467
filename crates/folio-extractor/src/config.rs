//! Per-source configuration for the extraction pipeline

use folio_domain::ExtractionSchema;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Text chunking strategy for a document source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChunkStrategy {
    /// Group OCR pages (separated by form feeds) into fixed-size windows
    PageWindow {
        /// Pages per chunk
        pages_per_chunk: usize,
        /// Windows with fewer trimmed characters are not sent to extraction
        min_content_chars: usize,
    },
    /// Cut only where a new record starts
    SemanticBoundary {
        /// Regex whose match starts mark record boundaries
        pattern: String,
        /// Preferred chunk size in characters; a chunk is cut at the first boundary past it
        target_chars: usize,
    },
    /// Fixed windows of characters, ignoring structure
    CharWindow {
        /// Characters per chunk
        max_chars: usize,
    },
}

impl Default for ChunkStrategy {
    fn default() -> Self {
        ChunkStrategy::PageWindow {
            pages_per_chunk: 2,
            min_content_chars: 50,
        }
    }
}

/// Drop everything from the last `marker` onwards, if it sits past `min_offset`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TruncateRule {
    /// Literal text marking the start of trailing material (e.g. an index)
    pub marker: String,
    /// Occurrences at or before this byte offset are ignored
    pub min_offset: usize,
}

/// Everything that varies between document sources
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceProfile {
    /// Profile name used on the command line; taken from the table key when
    /// the profile is defined in a config file
    #[serde(default)]
    pub name: String,

    /// How the sanitized text is split into chunks
    #[serde(default)]
    pub chunk_strategy: ChunkStrategy,

    /// Regexes removed from the text, applied in order
    #[serde(default)]
    pub noise_patterns: Vec<String>,

    /// Optional tail truncation
    #[serde(default)]
    pub truncate: Option<TruncateRule>,

    /// Source-specific extraction rules for the system prompt
    pub instructions: String,

    /// Optional worked example for the system prompt
    #[serde(default)]
    pub example: Option<String>,

    /// Text placed before the chunk in the user message
    #[serde(default = "default_preamble")]
    pub preamble: String,

    /// Appended to output table and checkpoint names
    #[serde(default)]
    pub artifact_suffix: String,

    /// Maximum time for a single extraction call (seconds)
    #[serde(default = "default_timeout_secs")]
    pub extraction_timeout_secs: u64,
}

impl SourceProfile {
    /// Get the extraction timeout as a Duration
    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_secs(self.extraction_timeout_secs)
    }

    /// Whether form feeds must survive sanitization
    pub fn keeps_page_separator(&self) -> bool {
        matches!(self.chunk_strategy, ChunkStrategy::PageWindow { .. })
    }

    /// Extraction schema over the canonical fields
    pub fn schema(&self) -> ExtractionSchema {
        let schema = ExtractionSchema::canonical(self.instructions.clone())
            .with_preamble(self.preamble.clone());
        match &self.example {
            Some(example) => schema.with_example(example.clone()),
            None => schema,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".to_string());
        }
        if self.instructions.trim().is_empty() {
            return Err("instructions must not be empty".to_string());
        }
        if self.extraction_timeout_secs == 0 {
            return Err("extraction_timeout_secs must be greater than 0".to_string());
        }
        match &self.chunk_strategy {
            ChunkStrategy::PageWindow { pages_per_chunk, .. } => {
                if *pages_per_chunk == 0 {
                    return Err("pages_per_chunk must be greater than 0".to_string());
                }
            }
            ChunkStrategy::SemanticBoundary { pattern, target_chars } => {
                if *target_chars == 0 {
                    return Err("target_chars must be greater than 0".to_string());
                }
                let regex = Regex::new(pattern)
                    .map_err(|e| format!("invalid boundary pattern {:?}: {}", pattern, e))?;
                if regex.is_match("") {
                    return Err(format!("boundary pattern {:?} matches empty text", pattern));
                }
            }
            ChunkStrategy::CharWindow { max_chars } => {
                if *max_chars == 0 {
                    return Err("max_chars must be greater than 0".to_string());
                }
            }
        }
        for pattern in &self.noise_patterns {
            Regex::new(pattern)
                .map_err(|e| format!("invalid noise pattern {:?}: {}", pattern, e))?;
        }
        if let Some(rule) = &self.truncate {
            if rule.marker.is_empty() {
                return Err("truncate marker must not be empty".to_string());
            }
        }
        Ok(())
    }

    /// Load a profile from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize the profile to a TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for SourceProfile {
    fn default() -> Self {
        Self::generic()
    }
}

/// Names of the built-in profiles
pub const BUILTIN_PROFILES: [&str; 5] = [
    "generic",
    "matthews",
    "matthews-sanitized",
    "kaplan",
    "briscoe",
];

impl SourceProfile {
    /// Look up a built-in profile by name
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "generic" => Some(Self::generic()),
            "matthews" => Some(Self::matthews()),
            "matthews-sanitized" => Some(Self::matthews_sanitized()),
            "kaplan" => Some(Self::kaplan()),
            "briscoe" => Some(Self::briscoe()),
            _ => None,
        }
    }

    /// OCR output with form-feed page breaks, two pages per chunk
    pub fn generic() -> Self {
        Self {
            name: "generic".to_string(),
            chunk_strategy: ChunkStrategy::default(),
            noise_patterns: Vec::new(),
            truncate: None,
            instructions: GENERIC_INSTRUCTIONS.to_string(),
            example: None,
            preamble: default_preamble(),
            artifact_suffix: String::new(),
            extraction_timeout_secs: default_timeout_secs(),
        }
    }

    /// British autobiographies: entries start with an ALL-CAPS surname and a comma
    pub fn matthews() -> Self {
        Self {
            name: "matthews".to_string(),
            chunk_strategy: ChunkStrategy::SemanticBoundary {
                pattern: r"\n\[?[A-Z\-]{3,},".to_string(),
                target_chars: 6000,
            },
            noise_patterns: [
                r"This content downloaded from.*",
                r"All use subject to.*",
                r"https://about\.jstor\.org/terms",
                r"BRITISH AUTOBIOGRAPHIES",
                r"University of California Press",
            ]
            .iter()
            .map(|p| p.to_string())
            .collect(),
            truncate: None,
            instructions: MATTHEWS_INSTRUCTIONS.to_string(),
            example: Some(MATTHEWS_EXAMPLE.to_string()),
            preamble: "Extract entries from this Matthews text:".to_string(),
            artifact_suffix: String::new(),
            extraction_timeout_secs: default_timeout_secs(),
        }
    }

    /// The Matthews text cut into plain 15000-character windows
    pub fn matthews_sanitized() -> Self {
        Self {
            name: "matthews-sanitized".to_string(),
            chunk_strategy: ChunkStrategy::CharWindow { max_chars: 15_000 },
            noise_patterns: Vec::new(),
            truncate: None,
            instructions: GENERIC_INSTRUCTIONS.to_string(),
            example: None,
            preamble: default_preamble(),
            artifact_suffix: "_sanitized".to_string(),
            extraction_timeout_secs: default_timeout_secs(),
        }
    }

    /// American autobiographies: entries start with "Surname, Given"
    pub fn kaplan() -> Self {
        Self {
            name: "kaplan".to_string(),
            chunk_strategy: ChunkStrategy::SemanticBoundary {
                pattern: r"\n[A-Z][a-z]+,\s[A-Z]".to_string(),
                target_chars: 6000,
            },
            noise_patterns: Vec::new(),
            truncate: Some(TruncateRule {
                marker: "\nSUBJECT INDEX".to_string(),
                min_offset: 100_000,
            }),
            instructions: KAPLAN_INSTRUCTIONS.to_string(),
            example: Some(KAPLAN_EXAMPLE.to_string()),
            preamble: "Extract ALL entries from this Kaplan text:".to_string(),
            artifact_suffix: String::new(),
            extraction_timeout_secs: default_timeout_secs(),
        }
    }

    /// American autobiography 1945-1980: entries start with a 4-digit index number
    pub fn briscoe() -> Self {
        let noise = [
            r"Oversize",
            r"016\.92",
            r"Am3",
            r"500[S6]199",
            r"M\.L\.",
            r"STO RA VN",
            r"W=——= O== = N — N =z = —— = —— = = N=—— = ~===3 — — ——_",
            r"This content downloaded from.*",
            r"All use subject to.*",
            r"American autobiography, 1980.*",
            r"1945-.*",
        ];

        Self {
            name: "briscoe".to_string(),
            chunk_strategy: ChunkStrategy::SemanticBoundary {
                pattern: r"\n(\d{4}\s+)".to_string(),
                target_chars: 6000,
            },
            noise_patterns: noise.iter().map(|p| p.to_string()).collect(),
            truncate: None,
            instructions: BRISCOE_INSTRUCTIONS.to_string(),
            example: Some(BRISCOE_EXAMPLE.to_string()),
            preamble: "Extract entries from this Briscoe text:".to_string(),
            artifact_suffix: String::new(),
            extraction_timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_preamble() -> String {
    "Extract entries from this text:".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

const GENERIC_INSTRUCTIONS: &str = r#"You transform bibliography text into structured JSON data.
Extract every independent bibliography entry from the provided text.

Rules:
- author1_last_name/first_name: the first author. "With ..." usually names author2.
- author2_last_name/first_name: the second author, if any.
- editor1_last_name/first_name: only when the text says "Edited by", "ed." or similar. Ignore introductions.
- title: the full title, merged across line breaks.
- original_date_of_publication: the earliest date given.
- dictation: YES for "As told to" or "Dictated by". "With" is not dictation.
- translation: YES for "Translated by".
- volume: e.g. "Volume II".
- number_of_pages: e.g. "290pp", original edition only.
- occupations, birth/death dates, places: extract when the text includes biographical details."#;

const MATTHEWS_INSTRUCTIONS: &str = r#"You are a specialist in bibliographical data extraction for British autobiographies.

Rules:
1. Entry boundary: an entry starts with an ALL CAPS last name followed by a comma.
2. Author: the ALL CAPS name is the last name; the name after it is the first name.
3. Title: usually near the end, before the date in parentheses.
4. Summary: the descriptive text about the author's life.
5. The number at the very end of an entry is an index number, not a date.
6. Occupations and locations: take them from the summary (e.g. "Leeds", "Surgeon")."#;

const MATTHEWS_EXAMPLE: &str = r#"Input: "ABBOTT, Maj.Gen. Augustus. Military Journal, 1838-42; service with Bengal Artillery in the Afghan War; marches; military details. The Afghan War, ed. Charles R. Low (1879). 1"
JSON Result:
{
  "entries": [
    {
      "author1_last_name": "ABBOTT",
      "author1_first_name": "Augustus (Maj.Gen.)",
      "title": "The Afghan War (Military Journal, 1838-42)",
      "editor1_last_name": "Low",
      "editor1_first_name": "Charles R.",
      "original_date_of_publication": "1879",
      "summary": "Service with Bengal Artillery in the Afghan War; marches; military details.",
      "occupations": "Major-General; Bengal Artillery"
    }
  ]
}"#;

const KAPLAN_INSTRUCTIONS: &str = r#"You are a specialist in bibliographical data extraction for bibliographies of American autobiographies.
Extract ALL independent entries from the provided text. Do not skip any.

Rules:
1. Author: the name at the start of the entry. The number in brackets [ID] is an identifier.
2. Publication: Location: Publisher, Year.
3. Summary: the text after the publication details."#;

const KAPLAN_EXAMPLE: &str = r#"Input: "Abbot, Willis John, 1863-1934. [3] Watching the world go by. Boston: Little, Brown, 1934. 358 p. WU. Reporter in Chicago and N.Y."
JSON Result:
{
  "entries": [
    {
      "author1_last_name": "Abbot",
      "author1_first_name": "Willis John",
      "date_of_birth": "1863",
      "date_of_death": "1934",
      "title": "Watching the world go by",
      "publisher": "Little, Brown",
      "publisher_location": "Boston",
      "original_date_of_publication": "1934",
      "number_of_pages": "358 p",
      "summary": "Reporter in Chicago and N.Y."
    }
  ]
}"#;

const BRISCOE_INSTRUCTIONS: &str = r#"You are a specialist in bibliographical data extraction for "American Autobiography 1945-1980".

Rules:
1. Ignore OCR noise such as "Oversize", "Am3", "500S199", "M.L.", "STO RA VN".
2. Publication details read: Location: Publisher, Year. (OrigYear) Pages.
3. Author dates: take birth-death years listed next to the name."#;

const BRISCOE_EXAMPLE: &str = r#"Input: "0044 Adams, John Quincy 1767-1848\nJohn Quincy Adams in Russia. Edited by Charles Francis Adams. New York: Praeger Publishers, 1970. (1874) 662 p.\nA reprint of Volume II..."
JSON Result:
{
  "entries": [
    {
      "author1_last_name": "Adams",
      "author1_first_name": "John Quincy",
      "date_of_birth": "1767",
      "date_of_death": "1848",
      "title": "John Quincy Adams in Russia",
      "editor1_last_name": "Adams",
      "editor1_first_name": "Charles Francis",
      "publisher": "Praeger Publishers",
      "publisher_location": "New York",
      "original_date_of_publication": "1874",
      "second_or_later_date_of_publication": "1970",
      "number_of_pages": "662 p",
      "summary": "A reprint of Volume II of his memoirs."
    }
  ]
}"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_profiles_are_valid() {
        for name in BUILTIN_PROFILES {
            let profile = SourceProfile::builtin(name).unwrap();
            assert_eq!(profile.name, name);
            assert!(profile.validate().is_ok(), "{} failed validation", name);
        }
    }

    #[test]
    fn test_unknown_builtin() {
        assert!(SourceProfile::builtin("nope").is_none());
    }

    #[test]
    fn test_default_is_two_page_windows() {
        let profile = SourceProfile::default();
        assert_eq!(
            profile.chunk_strategy,
            ChunkStrategy::PageWindow {
                pages_per_chunk: 2,
                min_content_chars: 50
            }
        );
        assert!(profile.keeps_page_separator());
        assert!(!SourceProfile::kaplan().keeps_page_separator());
    }

    #[test]
    fn test_invalid_pages_per_chunk() {
        let mut profile = SourceProfile::generic();
        profile.chunk_strategy = ChunkStrategy::PageWindow {
            pages_per_chunk: 0,
            min_content_chars: 50,
        };
        assert!(profile.validate().is_err());
    }

    #[test]
    fn test_invalid_boundary_pattern() {
        let mut profile = SourceProfile::kaplan();
        profile.chunk_strategy = ChunkStrategy::SemanticBoundary {
            pattern: r"\n(unclosed".to_string(),
            target_chars: 100,
        };
        assert!(profile.validate().unwrap_err().contains("boundary pattern"));
    }

    #[test]
    fn test_empty_matching_boundary_pattern_rejected() {
        let mut profile = SourceProfile::kaplan();
        profile.chunk_strategy = ChunkStrategy::SemanticBoundary {
            pattern: r"\n?".to_string(),
            target_chars: 100,
        };
        assert!(profile.validate().is_err());
    }

    #[test]
    fn test_invalid_noise_pattern() {
        let mut profile = SourceProfile::generic();
        profile.noise_patterns.push("[".to_string());
        assert!(profile.validate().unwrap_err().contains("noise pattern"));
    }

    #[test]
    fn test_invalid_timeout() {
        let mut profile = SourceProfile::generic();
        profile.extraction_timeout_secs = 0;
        assert!(profile.validate().is_err());
    }

    #[test]
    fn test_schema_carries_profile_text() {
        let schema = SourceProfile::kaplan().schema();
        assert_eq!(schema.preamble, "Extract ALL entries from this Kaplan text:");
        assert!(schema.example.unwrap().contains("Abbot"));
        assert_eq!(schema.fields.len(), folio_domain::FIELD_COUNT);
    }

    #[test]
    fn test_toml_round_trip() {
        let profile = SourceProfile::briscoe();
        let toml_str = profile.to_toml().unwrap();
        let parsed = SourceProfile::from_toml(&toml_str).unwrap();
        assert_eq!(profile, parsed);
    }

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let parsed = SourceProfile::from_toml(
            r#"
name = "custom"
instructions = "Extract entries."

[chunk_strategy]
type = "semantic_boundary"
pattern = '\n\d{4} '
target_chars = 3000
"#,
        )
        .unwrap();

        assert_eq!(parsed.extraction_timeout_secs, 120);
        assert_eq!(parsed.preamble, "Extract entries from this text:");
        assert!(parsed.noise_patterns.is_empty());
        assert!(parsed.validate().is_ok());
    }
}
