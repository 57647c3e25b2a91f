//! Client for the transcription backend.
//!
//! The backend handles video download, audio decoding, and speech
//! recognition internally; this client only knows the wire contract:
//! `POST /transcribe/{video_id}` returning time-coded text segments.

use notelink_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Transcription can take minutes for long videos (download + recognition),
/// so this client gets a much larger timeout than the other backends.
const REQUEST_TIMEOUT_SECS: u64 = 300;

/// A time-coded slice of transcribed speech.
///
/// Segments arrive ordered, with `start` monotonically non-decreasing and
/// `end >= start`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Segment start in seconds
    pub start: f64,

    /// Segment end in seconds
    pub end: f64,

    /// Transcribed text
    pub text: String,
}

/// Transcription backend response.
#[derive(Debug, Deserialize)]
pub struct TranscriptionResult {
    /// Ordered transcript segments
    pub segments: Vec<TranscriptSegment>,

    /// Detected language, when the backend reports one
    #[serde(default)]
    pub language: Option<String>,
}

/// Client for the transcription backend.
#[derive(Debug, Clone)]
pub struct TranscriptionClient {
    client: reqwest::Client,
    endpoint: String,
}

impl TranscriptionClient {
    /// Create a new client for the given endpoint (e.g. `http://127.0.0.1:8000`).
    pub fn new(endpoint: impl Into<String>) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                AppError::BackendUnavailable(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Transcribe a video by id.
    ///
    /// # Errors
    /// * `AppError::BackendUnavailable` - non-200 response or transport
    ///   failure; a hard failure for this video
    /// * `AppError::MalformedPayload` - response body violates the contract
    pub async fn transcribe(&self, video_id: &str) -> AppResult<TranscriptionResult> {
        let url = format!("{}/transcribe/{}", self.endpoint, video_id);

        tracing::info!("Requesting transcription for video '{}'", video_id);

        let response = self.client.post(&url).send().await.map_err(|e| {
            AppError::BackendUnavailable(format!("Failed to reach transcription backend: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::BackendUnavailable(format!(
                "Transcription backend error ({}): {}",
                status, body
            )));
        }

        let result: TranscriptionResult = response.json().await.map_err(|e| {
            AppError::MalformedPayload(format!("Failed to parse transcription response: {}", e))
        })?;

        tracing::info!(
            "Received {} transcript segments for '{}'{}",
            result.segments.len(),
            video_id,
            result
                .language
                .as_deref()
                .map(|l| format!(" (language: {})", l))
                .unwrap_or_default()
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_deserialization() {
        let raw = r#"{
            "segments": [
                {"start": 0.0, "end": 4.5, "text": " Hello there."},
                {"start": 4.5, "end": 9.0, "text": " General remarks."}
            ],
            "language": "en"
        }"#;

        let result: TranscriptionResult = serde_json::from_str(raw).unwrap();
        assert_eq!(result.segments.len(), 2);
        assert_eq!(result.segments[0].start, 0.0);
        assert_eq!(result.segments[1].text, " General remarks.");
        assert_eq!(result.language.as_deref(), Some("en"));
    }

    #[test]
    fn test_response_without_language() {
        let raw = r#"{"segments": []}"#;
        let result: TranscriptionResult = serde_json::from_str(raw).unwrap();
        assert!(result.segments.is_empty());
        assert!(result.language.is_none());
    }
}
