//! OpenAI-compatible chat-completions provider
//!
//! Talks to any endpoint implementing `POST {endpoint}/chat/completions`
//! (OpenAI, Azure-style proxies, Ollama's OpenAI shim).
//!
//! # Features
//!
//! - Async HTTP communication via `reqwest`
//! - JSON-object response mode
//! - Retry with exponential backoff on transport errors, 429 and 5xx
//! - Per-request timeout
//!
//! # Examples
//!
//! ```no_run
//! use folio_llm::OpenAiProvider;
//!
//! let provider = OpenAiProvider::from_env("OPENAI_API_KEY", "gpt-4o-mini").unwrap();
//! ```

use crate::LlmError;
use folio_domain::traits::LlmProvider as LlmProviderTrait;
use folio_domain::CompletionRequest;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Default OpenAI API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";

/// Default model
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default timeout for LLM requests (120 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default number of attempts per request
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Longest error body kept in an error message
const MAX_ERROR_BODY: usize = 500;

/// Slack added to the retry budget for connection setup and body decoding
const BUDGET_GRACE: Duration = Duration::from_secs(1);

/// Chat-completions provider
pub struct OpenAiProvider {
    endpoint: String,
    model: String,
    api_key: String,
    client: reqwest::Client,
    timeout: Duration,
    max_retries: u32,
    base_delay: Duration,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// Outcome of a single HTTP attempt
enum Attempt {
    Done(Result<String, LlmError>),
    Retry(LlmError),
}

impl OpenAiProvider {
    /// Create a new provider
    ///
    /// # Parameters
    ///
    /// - `endpoint`: API base URL without the `/chat/completions` suffix
    /// - `api_key`: Bearer token
    /// - `model`: Model to use (e.g., "gpt-4o-mini")
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Config` if the HTTP client cannot be built.
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, LlmError> {
        let timeout = Duration::from_secs(DEFAULT_TIMEOUT_SECS);
        let client = build_client(timeout)?;

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
            client,
            timeout,
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: Duration::from_secs(1),
        })
    }

    /// Create a provider against the default endpoint, reading the key from `key_var`
    pub fn from_env(key_var: &str, model: impl Into<String>) -> Result<Self, LlmError> {
        let api_key = std::env::var(key_var)
            .map_err(|_| LlmError::Config(format!("{} environment variable not set", key_var)))?;
        Self::new(DEFAULT_ENDPOINT, api_key, model)
    }

    /// Set the maximum number of attempts per request (at least 1)
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// Set the per-request HTTP timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, LlmError> {
        self.client = build_client(timeout)?;
        self.timeout = timeout;
        Ok(self)
    }

    /// Set the first backoff delay; later delays double
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Endpoint base URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Worst case for [`chat`](Self::chat): every attempt runs to the HTTP
    /// timeout and every backoff delay is slept.
    pub fn retry_budget(&self) -> Duration {
        let attempts = self.timeout * self.max_retries;
        let backoff: Duration = (0..self.max_retries.saturating_sub(1))
            .map(|i| self.base_delay * 2u32.pow(i))
            .sum();
        attempts + backoff + BUDGET_GRACE
    }

    /// Send a chat completion, retrying transient failures
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The endpoint is unreachable after all attempts
    /// - The request is rejected (4xx other than 429)
    /// - The rate limit persists after all attempts
    /// - The response body is not a chat-completion object
    pub async fn chat(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.endpoint);
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            response_format: request.json_mode.then_some(ResponseFormat {
                kind: "json_object",
            }),
        };

        let mut attempts = 0;
        let mut last_error = None;

        while attempts < self.max_retries {
            match self.attempt(&url, &body).await {
                Attempt::Done(result) => return result,
                Attempt::Retry(error) => {
                    warn!(
                        attempt = attempts + 1,
                        max = self.max_retries,
                        "Chat completion failed: {}",
                        error
                    );
                    last_error = Some(error);
                }
            }

            attempts += 1;
            if attempts < self.max_retries {
                // Exponential backoff: base, 2*base, 4*base, ...
                let delay = self.base_delay * 2u32.pow(attempts - 1);
                debug!("Retrying in {:?}", delay);
                tokio::time::sleep(delay).await;
            }
        }

        Err(last_error.unwrap_or_else(|| {
            LlmError::Communication("Max retries exceeded".to_string())
        }))
    }

    async fn attempt(&self, url: &str, body: &ChatRequest<'_>) -> Attempt {
        let response = match self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                return Attempt::Retry(LlmError::Communication(format!("Request failed: {}", e)))
            }
        };

        let status = response.status();
        if status.is_success() {
            let parsed = response.json::<ChatResponse>().await.map_err(|e| {
                LlmError::InvalidResponse(format!("Failed to parse response: {}", e))
            });
            return Attempt::Done(parsed.and_then(first_message));
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Attempt::Retry(LlmError::RateLimitExceeded);
        }

        let mut error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        truncate_on_char_boundary(&mut error_text, MAX_ERROR_BODY);

        if status.is_server_error() {
            Attempt::Retry(LlmError::Communication(format!(
                "HTTP {}: {}",
                status, error_text
            )))
        } else {
            Attempt::Done(Err(LlmError::Rejected {
                status: status.as_u16(),
                body: error_text,
            }))
        }
    }
}

impl LlmProviderTrait for OpenAiProvider {
    type Error = LlmError;

    async fn complete(&self, request: &CompletionRequest) -> Result<String, Self::Error> {
        self.chat(request).await
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn call_budget(&self) -> Option<Duration> {
        Some(self.retry_budget())
    }
}

fn build_client(timeout: Duration) -> Result<reqwest::Client, LlmError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| LlmError::Config(format!("Failed to build HTTP client: {}", e)))
}

fn first_message(response: ChatResponse) -> Result<String, LlmError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| LlmError::InvalidResponse("Response has no message content".to_string()))
}

fn truncate_on_char_boundary(text: &mut String, max: usize) {
    if text.len() > max {
        let mut cut = max;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        text.truncate(cut);
    }
}
