//! Concept tagging: short labels per chunk, extracted by the messages
//! backend.
//!
//! Tagging is an optional enrichment. Chunks go to the backend in small
//! batches; a batch that fails (backend error or malformed labels) degrades
//! to empty label sets with a warning instead of failing the processing run.

use crate::embeddings::strip_code_fences;
use notelink_core::{AppError, AppResult};
use notelink_llm::{retry_with_backoff, MessagesClient, RetryPolicy};

/// Chunks per backend call.
const BATCH_SIZE: usize = 5;

/// Token budget for a tagging response.
const MAX_TOKENS: u32 = 1024;

/// Extracts concept labels for chunks in batches.
#[derive(Debug, Clone)]
pub struct ConceptTagger {
    client: MessagesClient,
    retry: RetryPolicy,
}

impl ConceptTagger {
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

    /// Tag every chunk text with concept labels.
    ///
    /// The result is aligned index-for-index with `chunks`; a failed batch
    /// contributes empty label sets for its chunks.
    pub async fn tag_chunks(&self, chunks: &[String]) -> Vec<Vec<String>> {
        let mut labels: Vec<Vec<String>> = Vec::with_capacity(chunks.len());

        for batch in chunks.chunks(BATCH_SIZE) {
            match self.tag_batch(batch).await {
                Ok(batch_labels) => labels.extend(batch_labels),
                Err(e) => {
                    tracing::warn!(
                        "Concept tagging failed for a batch of {} chunks: {}",
                        batch.len(),
                        e
                    );
                    labels.extend(std::iter::repeat_with(Vec::new).take(batch.len()));
                }
            }
        }

        labels
    }

    async fn tag_batch(&self, batch: &[String]) -> AppResult<Vec<Vec<String>>> {
        let prompt = tagging_prompt(batch);

        let response =
            retry_with_backoff(|| self.client.complete(&prompt, MAX_TOKENS), self.retry).await?;

        parse_labels(&response, batch.len())
    }
}

/// Build the prompt asking for per-chunk label arrays.
fn tagging_prompt(batch: &[String]) -> String {
    let mut prompt = String::from(
        "Extract 1-3 short concept labels for each numbered text below. \
         Respond with ONLY a JSON array of arrays of strings, one inner \
         array per text, in order, with no explanation and no code fences.\n",
    );

    for (i, chunk) in batch.iter().enumerate() {
        prompt.push_str(&format!("\n{}. {}", i + 1, chunk));
    }

    prompt
}

/// Parse a tagging payload and check its shape against the batch.
fn parse_labels(payload: &str, expected: usize) -> AppResult<Vec<Vec<String>>> {
    let cleaned = strip_code_fences(payload);

    let labels: Vec<Vec<String>> = serde_json::from_str(cleaned).map_err(|e| {
        AppError::MalformedPayload(format!(
            "Concept payload is not an array of string arrays: {}",
            e
        ))
    })?;

    if labels.len() != expected {
        return Err(AppError::MalformedPayload(format!(
            "Concept payload has {} entries, expected {}",
            labels.len(),
            expected
        )));
    }

    Ok(labels)
}
