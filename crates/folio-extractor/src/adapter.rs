//! LLM-backed entry extraction

use crate::error::ExtractorError;
use crate::parser::parse_llm_response;
use crate::prompt::PromptBuilder;
use folio_domain::traits::{EntryExtractor, LlmProvider};
use folio_domain::{ExtractionSchema, PartialRecord};
use std::fmt::Display;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Sends one chunk to an LLM provider and parses the reply.
///
/// Never fails: provider errors, timeouts and malformed responses are logged
/// and turned into an empty list, so one bad chunk cannot stop a document.
pub struct LlmExtractionAdapter<P> {
    provider: P,
    timeout: Duration,
}

impl<P> LlmExtractionAdapter<P>
where
    P: LlmProvider + Sync,
    P::Error: Display,
{
    /// Create an adapter with a per-call timeout.
    ///
    /// The timeout is raised to the provider's call budget when that is longer,
    /// so the deadline never cuts a provider's own retries short.
    pub fn new(provider: P, timeout: Duration) -> Self {
        let timeout = match provider.call_budget() {
            Some(budget) if budget > timeout => {
                debug!(?budget, requested = ?timeout, "Extraction deadline raised to provider budget");
                budget
            }
            _ => timeout,
        };
        Self { provider, timeout }
    }

    /// Deadline applied to each extraction
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The wrapped provider
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Extract, keeping the failure reason
    pub async fn try_extract(
        &self,
        text: &str,
        schema: &ExtractionSchema,
    ) -> Result<Vec<PartialRecord>, ExtractorError> {
        let request = PromptBuilder::new(schema, text).build();
        debug!(
            model = self.provider.model_name(),
            prompt_chars = request.system.len() + request.user.len(),
            "Calling LLM"
        );

        let response = timeout(self.timeout, self.provider.complete(&request))
            .await
            .map_err(|_| ExtractorError::Timeout(self.timeout.as_secs()))?
            .map_err(|e| ExtractorError::Llm(e.to_string()))?;

        debug!("LLM response length: {} chars", response.len());
        parse_llm_response(&response)
    }
}

impl<P> EntryExtractor for LlmExtractionAdapter<P>
where
    P: LlmProvider + Sync,
    P::Error: Display,
{
    async fn extract(&self, text: &str, schema: &ExtractionSchema) -> Vec<PartialRecord> {
        match self.try_extract(text, schema).await {
            Ok(records) => records,
            Err(e) => {
                warn!("Extraction failed, chunk yields no entries: {}", e);
                Vec::new()
            }
        }
    }
}
