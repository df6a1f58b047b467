//! LLM prompt construction for entry extraction

use folio_domain::traits::CompletionRequest;
use folio_domain::{ExtractionSchema, SENTINEL};

/// Builds the completion request for one chunk
pub struct PromptBuilder<'a> {
    schema: &'a ExtractionSchema,
    text: &'a str,
}

impl<'a> PromptBuilder<'a> {
    /// Create a new prompt builder
    pub fn new(schema: &'a ExtractionSchema, text: &'a str) -> Self {
        Self { schema, text }
    }

    /// System message: source rules, field list, optional worked example
    pub fn system_prompt(&self) -> String {
        let mut prompt = String::new();

        // 1. Source-specific rules
        prompt.push_str(self.schema.instructions.trim_end());
        prompt.push_str("\n\n");

        // 2. Output shape over the canonical fields
        prompt.push_str(&format!(
            "Return a JSON object with a key \"entries\" containing a list of objects.\n\
             Each object must have the following keys (use \"{}\" if the information is missing):\n",
            SENTINEL
        ));
        prompt.push_str(&self.schema.fields.join(", "));
        prompt.push_str("\n\n");

        // 3. Worked example
        if let Some(example) = &self.schema.example {
            prompt.push_str("Example:\n");
            prompt.push_str(example.trim_end());
            prompt.push_str("\n\n");
        }

        prompt.push_str(OUTPUT_FORMAT_REMINDER);
        prompt
    }

    /// User message: preamble followed by the chunk text
    pub fn user_prompt(&self) -> String {
        format!("{}\n\n{}", self.schema.preamble, self.text)
    }

    /// Build the complete request
    pub fn build(&self) -> CompletionRequest {
        CompletionRequest {
            system: self.system_prompt(),
            user: self.user_prompt(),
            json_mode: true,
        }
    }
}

const OUTPUT_FORMAT_REMINDER: &str =
    "Output a single JSON object only, with no Markdown formatting and no additional text.";
