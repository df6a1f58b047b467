//! Folio LLM Provider Layer
//!
//! Implementations of the `LlmProvider` trait from `folio-domain`.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic scripted provider for testing
//! - `OpenAiProvider`: OpenAI-compatible chat-completions API
//!
//! # Examples
//!
//! ```
//! use folio_domain::traits::LlmProvider;
//! use folio_domain::CompletionRequest;
//! use folio_llm::MockProvider;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let provider = MockProvider::new(r#"{"entries": []}"#);
//! let request = CompletionRequest {
//!     system: "Extract data.".to_string(),
//!     user: "some text".to_string(),
//!     json_mode: true,
//! };
//! assert_eq!(provider.complete(&request).await.unwrap(), r#"{"entries": []}"#);
//! # }
//! ```

#![warn(missing_docs)]

pub mod openai;

use folio_domain::traits::LlmProvider as LlmProviderTrait;
use folio_domain::CompletionRequest;
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use openai::OpenAiProvider;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Non-success HTTP status that is not worth retrying
    #[error("Request rejected with HTTP {status}: {body}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Response body, possibly truncated
        body: String,
    },

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit still exceeded after all retries
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Missing credentials or bad provider settings
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

/// One scripted behavior of the mock
#[derive(Debug, Clone)]
enum Script {
    Respond(String),
    Fail(String),
}

/// Mock LLM provider for deterministic testing
///
/// Returns pre-configured responses without making any network calls. Rules
/// match on a substring of the user message, so tests can script a response
/// per chunk. Every request is recorded.
///
/// # Examples
///
/// ```
/// use folio_llm::MockProvider;
///
/// let mut provider = MockProvider::new(r#"{"entries": []}"#);
/// provider.add_response("0001 Smith", r#"{"entries": [{"author1_last_name": "Smith"}]}"#);
/// provider.add_error("0002 Doe");
/// assert_eq!(provider.call_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default: Script,
    rules: Arc<Mutex<Vec<(String, Script)>>>,
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all requests
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default: Script::Respond(response.into()),
            rules: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a MockProvider that fails every request
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            default: Script::Fail(message.into()),
            ..Self::new("")
        }
    }

    /// Respond with `response` when the user message contains `needle`
    pub fn add_response(&mut self, needle: impl Into<String>, response: impl Into<String>) {
        self.rules
            .lock()
            .unwrap()
            .push((needle.into(), Script::Respond(response.into())));
    }

    /// Fail when the user message contains `needle`
    pub fn add_error(&mut self, needle: impl Into<String>) {
        self.rules
            .lock()
            .unwrap()
            .push((needle.into(), Script::Fail("Mock error".to_string())));
    }

    /// Get the number of times complete was called
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// All requests received so far, in order
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.calls.lock().unwrap().clone()
    }

    /// Reset the recorded calls
    pub fn reset_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn script_for(&self, request: &CompletionRequest) -> Script {
        let rules = self.rules.lock().unwrap();
        rules
            .iter()
            .find(|(needle, _)| request.user.contains(needle.as_str()))
            .map(|(_, script)| script.clone())
            .unwrap_or_else(|| self.default.clone())
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new(r#"{"entries": []}"#)
    }
}

impl LlmProviderTrait for MockProvider {
    type Error = LlmError;

    async fn complete(&self, request: &CompletionRequest) -> Result<String, Self::Error> {
        self.calls.lock().unwrap().push(request.clone());

        match self.script_for(request) {
            Script::Respond(response) => Ok(response),
            Script::Fail(message) => Err(LlmError::Other(message)),
        }
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(user: &str) -> CompletionRequest {
        CompletionRequest {
            system: "system".to_string(),
            user: user.to_string(),
            json_mode: true,
        }
    }

    #[tokio::test]
    async fn test_mock_provider_default() {
        let provider = MockProvider::new("Test response");
        let result = provider.complete(&request("any prompt")).await;
        assert_eq!(result.unwrap(), "Test response");
    }

    #[tokio::test]
    async fn test_mock_provider_substring_rules() {
        let mut provider = MockProvider::default();
        provider.add_response("hello", "world");
        provider.add_response("foo", "bar");

        assert_eq!(provider.complete(&request("say hello")).await.unwrap(), "world");
        assert_eq!(provider.complete(&request("foo!")).await.unwrap(), "bar");
        assert_eq!(
            provider.complete(&request("unknown")).await.unwrap(),
            r#"{"entries": []}"#
        );
    }

    #[tokio::test]
    async fn test_mock_provider_records_calls() {
        let provider = MockProvider::new("test");
        assert_eq!(provider.call_count(), 0);

        provider.complete(&request("first")).await.unwrap();
        provider.complete(&request("second")).await.unwrap();
        assert_eq!(provider.call_count(), 2);
        assert_eq!(provider.requests()[1].user, "second");

        provider.reset_calls();
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_mock_provider_error() {
        let mut provider = MockProvider::default();
        provider.add_error("bad chunk");

        let result = provider.complete(&request("a bad chunk here")).await;
        assert!(matches!(result.unwrap_err(), LlmError::Other(_)));
    }

    #[tokio::test]
    async fn test_failing_provider_fails_everything() {
        let provider = MockProvider::failing("boom");
        let result = provider.complete(&request("anything")).await;
        assert!(matches!(result, Err(LlmError::Other(msg)) if msg == "boom"));
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_provider_clone_shares_state() {
        let provider1 = MockProvider::new("test");
        let provider2 = provider1.clone();

        provider1.complete(&request("test")).await.unwrap();

        assert_eq!(provider1.call_count(), 1);
        assert_eq!(provider2.call_count(), 1);
    }
}
