//! Parse LLM output into partial records

use crate::error::ExtractorError;
use folio_domain::PartialRecord;
use serde_json::{Map, Value};

/// Separator used when a field value comes back as a list
const LIST_SEPARATOR: &str = "; ";

/// Parse an LLM response of the form `{"entries": [{...}, ...]}`.
///
/// Any shape problem fails the whole response: the caller treats the chunk
/// as having produced nothing rather than keeping a partial list.
pub fn parse_llm_response(response: &str) -> Result<Vec<PartialRecord>, ExtractorError> {
    // LLMs sometimes wrap JSON in markdown code blocks
    let json_str = extract_json(response)?;

    let json: Value = serde_json::from_str(json_str)?;

    let root = json
        .as_object()
        .ok_or_else(|| ExtractorError::InvalidFormat("Expected JSON object".to_string()))?;

    let entries = root
        .get("entries")
        .ok_or_else(|| ExtractorError::InvalidFormat("Missing 'entries' key".to_string()))?
        .as_array()
        .ok_or_else(|| ExtractorError::InvalidFormat("'entries' is not an array".to_string()))?;

    entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let obj = entry.as_object().ok_or_else(|| {
                ExtractorError::InvalidFormat(format!("Entry {} is not a JSON object", idx))
            })?;
            parse_entry(obj)
                .map_err(|e| ExtractorError::InvalidFormat(format!("Entry {}: {}", idx, e)))
        })
        .collect()
}

/// Extract JSON from response, handling markdown code blocks
fn extract_json(response: &str) -> Result<&str, ExtractorError> {
    let trimmed = response.trim();

    if let Some(fenced) = trimmed.strip_prefix("```") {
        // Drop the opening line (```json or ```) and the closing fence
        let body = fenced
            .split_once('\n')
            .map(|(_, rest)| rest)
            .ok_or_else(|| ExtractorError::InvalidFormat("Empty code block".to_string()))?;
        let body = body.trim_end();
        Ok(body.strip_suffix("```").unwrap_or(body).trim())
    } else {
        Ok(trimmed)
    }
}

fn parse_entry(obj: &Map<String, Value>) -> Result<PartialRecord, String> {
    let mut record = PartialRecord::new();
    for (key, value) in obj {
        if let Some(text) = field_text(value).map_err(|e| format!("field '{}' {}", key, e))? {
            record.insert(key.clone(), text);
        }
    }
    Ok(record)
}

/// Flatten one field value to text; `None` means absent
fn field_text(value: &Value) -> Result<Option<String>, String> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Array(items) => {
            let mut parts = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::Array(_) | Value::Object(_) => {
                        return Err("contains a nested structure".to_string());
                    }
                    scalar => {
                        if let Some(text) = field_text(scalar)? {
                            parts.push(text);
                        }
                    }
                }
            }
            Ok(Some(parts.join(LIST_SEPARATOR)))
        }
        Value::Object(_) => Err("is an object".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_json() {
        let response = r#"{
            "entries": [
                {"author1_last_name": "Smith", "title": "Title X"},
                {"author1_last_name": "Doe", "title": "Title Y"}
            ]
        }"#;

        let records = parse_llm_response(response).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["author1_last_name"], "Smith");
        assert_eq!(records[1]["title"], "Title Y");
    }

    #[test]
    fn test_parse_json_with_markdown_wrapper() {
        let response = "```json\n{\"entries\": [{\"title\": \"Fenced\"}]}\n```";
        let records = parse_llm_response(response).unwrap();
        assert_eq!(records[0]["title"], "Fenced");
    }

    #[test]
    fn test_parse_json_with_bare_fence() {
        let response = "```\n{\"entries\": []}\n```\n";
        assert!(parse_llm_response(response).unwrap().is_empty());
    }

    #[test]
    fn test_scalar_values_are_stringified() {
        let response = r#"{"entries": [{
            "number_of_pages": 290,
            "dictation": true,
            "volume": null,
            "occupations": ["Surgeon", "Author"]
        }]}"#;

        let record = &parse_llm_response(response).unwrap()[0];
        assert_eq!(record["number_of_pages"], "290");
        assert_eq!(record["dictation"], "true");
        assert!(!record.contains_key("volume"));
        assert_eq!(record["occupations"], "Surgeon; Author");
    }

    #[test]
    fn test_unknown_keys_are_kept_for_the_normalizer() {
        let response = r#"{"entries": [{"title": "T", "isbn": "123"}]}"#;
        let record = &parse_llm_response(response).unwrap()[0];
        assert_eq!(record["isbn"], "123");
    }

    #[test]
    fn test_parse_invalid_json() {
        let result = parse_llm_response("This is not JSON");
        assert!(matches!(result, Err(ExtractorError::JsonParse(_))));
    }

    #[test]
    fn test_root_must_be_object() {
        let result = parse_llm_response(r#"[{"title": "T"}]"#);
        assert!(matches!(result, Err(ExtractorError::InvalidFormat(_))));
    }

    #[test]
    fn test_entries_must_be_present() {
        let result = parse_llm_response(r#"{"records": []}"#);
        assert!(matches!(result, Err(ExtractorError::InvalidFormat(_))));
    }

    #[test]
    fn test_entries_must_be_array() {
        let result = parse_llm_response(r#"{"entries": {"title": "T"}}"#);
        assert!(matches!(result, Err(ExtractorError::InvalidFormat(_))));
    }

    #[test]
    fn test_non_object_entry_fails_whole_response() {
        let result = parse_llm_response(r#"{"entries": [{"title": "T"}, "oops"]}"#);
        assert!(matches!(result, Err(ExtractorError::InvalidFormat(_))));
    }

    #[test]
    fn test_nested_object_value_fails_whole_response() {
        let result = parse_llm_response(r#"{"entries": [{"author": {"last": "Smith"}}]}"#);
        assert!(matches!(result, Err(ExtractorError::InvalidFormat(msg)) if msg.contains("author")));
    }

    #[test]
    fn test_empty_code_block() {
        let result = parse_llm_response("```");
        assert!(matches!(result, Err(ExtractorError::InvalidFormat(_))));
    }
}
