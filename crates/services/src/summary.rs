//! Weekly-report text generation behind the [`Summarizer`] trait.
//!
//! The production implementation ([`HttpSummarizer`]) calls a Gemini-style
//! `generateContent` endpoint. The trait seam lets the background refresh
//! job run against a canned implementation in tests.

use std::time::Duration;

use async_trait::async_trait;

/// Default generation model.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Per-request timeout for the generation call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors from the summary-generation layer.
#[derive(Debug, thiserror::Error)]
pub enum SummaryError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The endpoint returned a non-2xx status code.
    #[error("Generation API error ({status}): {body}")]
    Api {
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The endpoint answered 2xx but the body had no candidate text.
    #[error("Malformed generation response: {0}")]
    Malformed(String),
}

/// Turns a rendered prompt into narrative text.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, SummaryError>;
}

/// Production [`Summarizer`] backed by a Gemini-style HTTP endpoint.
pub struct HttpSummarizer {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl HttpSummarizer {
    /// Create a client for the given endpoint, model, and API key.
    pub fn new(base_url: String, model: String, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            model,
            api_key,
        }
    }
}

#[async_trait]
impl Summarizer for HttpSummarizer {
    async fn generate(&self, prompt: &str) -> Result<String, SummaryError> {
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
        });

        let response = self
            .client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, self.model
            ))
            .header("x-goog-api-key", &self.api_key)
            .timeout(REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(SummaryError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body: serde_json::Value = response.json().await?;
        extract_candidate_text(&body)
    }
}

/// Pull the first candidate's text out of a `generateContent` response.
fn extract_candidate_text(body: &serde_json::Value) -> Result<String, SummaryError> {
    body.pointer("/candidates/0/content/parts/0/text")
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .ok_or_else(|| SummaryError::Malformed("no candidate text in response".to_string()))
}

/// Test double that returns the same text for every prompt.
pub struct FixedSummarizer(pub String);

#[async_trait]
impl Summarizer for FixedSummarizer {
    async fn generate(&self, _prompt: &str) -> Result<String, SummaryError> {
        Ok(self.0.clone())
    }
}
