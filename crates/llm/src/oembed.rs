//! Video title lookup via oEmbed.
//!
//! Title lookup is best-effort: any failure falls back to a synthesized
//! placeholder embedding the video id, so a note always gets a title.

use notelink_core::AppResult;
use serde::Deserialize;
use std::time::Duration;

const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
struct OembedResponse {
    #[serde(default)]
    title: Option<String>,
}

/// oEmbed title lookup client.
#[derive(Debug, Clone)]
pub struct OembedClient {
    client: reqwest::Client,
    endpoint: String,
}

impl OembedClient {
    /// Create a new client for the given oEmbed endpoint
    /// (e.g. `https://www.youtube.com/oembed`).
    pub fn new(endpoint: impl Into<String>) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                notelink_core::AppError::BackendUnavailable(format!(
                    "Failed to create HTTP client: {}",
                    e
                ))
            })?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Look up the title for a video, falling back to a placeholder.
    pub async fn title(&self, video_id: &str) -> String {
        match self.fetch_title(video_id).await {
            Some(title) => title,
            None => {
                tracing::debug!("Title lookup failed for '{}', using placeholder", video_id);
                fallback_title(video_id)
            }
        }
    }

    async fn fetch_title(&self, video_id: &str) -> Option<String> {
        let watch_url = format!("https://www.youtube.com/watch?v={}", video_id);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("url", watch_url.as_str()), ("format", "json")])
            .send()
            .await
            .ok()?;

        if !response.status().is_success() {
            return None;
        }

        let body: OembedResponse = response.json().await.ok()?;
        body.title.filter(|t| !t.trim().is_empty())
    }
}

/// Placeholder title for when the lookup fails.
fn fallback_title(video_id: &str) -> String {
    format!("YouTube Video {}", video_id)
}
