//! Theme and summary extraction from a transcript.
//!
//! One messages call over a bounded transcript prefix. Extraction failures
//! never abort a processing run: the analysis degrades to empty themes and
//! a placeholder summary so that a title and a note still get created.

use crate::embeddings::strip_code_fences;
use crate::types::TranscriptAnalysis;
use notelink_core::{AppError, AppResult};
use notelink_llm::{retry_with_backoff, MessagesClient, RetryPolicy};

/// Bound on the transcript prefix sent for analysis.
const MAX_INPUT_CHARS: usize = 8000;

/// Token budget for the analysis response.
const MAX_TOKENS: u32 = 1024;

/// Extracts themes and a short summary from a transcript.
#[derive(Debug, Clone)]
pub struct ThemeExtractor {
    client: MessagesClient,
    retry: RetryPolicy,
}

impl ThemeExtractor {
    pub fn new(client: MessagesClient) -> Self {
        Self {
            client,
            retry: RetryPolicy::default(),
        }
    }

    /// Override the retry policy (used by tests to avoid real backoff).
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Analyze a transcript, degrading to a placeholder on failure.
    pub async fn analyze(&self, transcript: &str) -> TranscriptAnalysis {
        match self.try_analyze(transcript).await {
            Ok(analysis) => analysis,
            Err(e) => {
                tracing::warn!("Theme extraction failed, continuing degraded: {}", e);
                TranscriptAnalysis::degraded()
            }
        }
    }

    async fn try_analyze(&self, transcript: &str) -> AppResult<TranscriptAnalysis> {
        let input: String = transcript.chars().take(MAX_INPUT_CHARS).collect();
        let prompt = analysis_prompt(&input);

        let response =
            retry_with_backoff(|| self.client.complete(&prompt, MAX_TOKENS), self.retry).await?;

        parse_analysis(&response)
    }
}

fn analysis_prompt(transcript: &str) -> String {
    format!(
        "Identify the main themes of this transcript and write a 2-3 \
         sentence summary. Respond with ONLY a JSON object of the form \
         {{\"themes\": [\"...\"], \"summary\": \"...\"}}, with no \
         explanation and no code fences.\n\nTranscript: {transcript}"
    )
}

/// Parse an analysis payload, tolerating fences.
fn parse_analysis(payload: &str) -> AppResult<TranscriptAnalysis> {
    let cleaned = strip_code_fences(payload);

    serde_json::from_str(cleaned).map_err(|e| {
        AppError::MalformedPayload(format!("Analysis payload violates schema: {}", e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_analysis() {
        let payload = r#"{"themes": ["ownership", "lifetimes"], "summary": "A talk about Rust."}"#;
        let analysis = parse_analysis(payload).unwrap();
        assert_eq!(analysis.themes, vec!["ownership", "lifetimes"]);
        assert_eq!(analysis.summary, "A talk about Rust.");
    }

    #[test]
    fn test_parse_fenced_analysis() {
        let payload = "```json\n{\"themes\": [], \"summary\": \"s\"}\n```";
        let analysis = parse_analysis(payload).unwrap();
        assert_eq!(analysis.summary, "s");
    }

    #[test]
    fn test_parse_missing_fields_default() {
        // Both fields default, so a bare object is acceptable
        let analysis = parse_analysis("{}").unwrap();
        assert!(analysis.themes.is_empty());
        assert!(analysis.summary.is_empty());
    }

    #[test]
    fn test_parse_non_object_rejected() {
        let err = parse_analysis("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, AppError::MalformedPayload(_)));
    }
}
