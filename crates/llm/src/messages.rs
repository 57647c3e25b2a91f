//! Client for the messages-style text-analysis backend.
//!
//! The backend serves every text-analysis task in the pipeline: embeddings,
//! theme extraction, and concept tagging. Requests carry an API key and a
//! protocol version header; the response wraps the actual payload in a
//! `content` array whose first element's `text` field holds the task output
//! (itself either free text or JSON, depending on the task). That double
//! encoding is preserved here: this client returns the inner text verbatim
//! and leaves task-specific parsing to callers.

use notelink_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Protocol version header value.
const API_VERSION: &str = "2023-06-01";

/// Request timeout in seconds. The reference had no enforced upper bound;
/// an explicit timeout is the redesigned behavior.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Messages API request body.
#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

/// Messages API response envelope.
#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

/// Client for the messages-style text-analysis backend.
#[derive(Debug, Clone)]
pub struct MessagesClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl MessagesClient {
    /// Create a new client.
    ///
    /// # Errors
    /// * `AppError::BackendUnavailable` - if the HTTP client cannot be built
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                AppError::BackendUnavailable(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    /// Model identifier this client sends.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a single user-role prompt and return the inner response text.
    ///
    /// # Errors
    /// * `AppError::RateLimited` - HTTP 429; the only retryable failure
    /// * `AppError::BackendUnavailable` - any other non-200 response, or a
    ///   transport failure
    /// * `AppError::MalformedPayload` - envelope violations (missing or
    ///   empty `content`, first block without `text`)
    pub async fn complete(&self, prompt: &str, max_tokens: u32) -> AppResult<String> {
        let url = format!("{}/v1/messages", self.endpoint);

        let request = MessagesRequest {
            model: self.model.clone(),
            max_tokens,
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        tracing::debug!(
            "Sending messages request to {} (prompt: {} chars)",
            url,
            prompt.len()
        );

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                AppError::BackendUnavailable(format!("Failed to reach messages backend: {}", e))
            })?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::RateLimited(format!(
                "Messages backend rate limited: {}",
                body
            )));
        }

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::BackendUnavailable(format!(
                "Messages backend error ({}): {}",
                status, body
            )));
        }

        let body: MessagesResponse = response.json().await.map_err(|e| {
            AppError::MalformedPayload(format!("Failed to parse messages response: {}", e))
        })?;

        extract_text(body)
    }
}

/// Pull the payload text out of the response envelope.
fn extract_text(response: MessagesResponse) -> AppResult<String> {
    let block = response.content.into_iter().next().ok_or_else(|| {
        AppError::MalformedPayload("Messages response has empty content array".to_string())
    })?;

    block.text.ok_or_else(|| {
        AppError::MalformedPayload("First content block has no text field".to_string())
    })
}
