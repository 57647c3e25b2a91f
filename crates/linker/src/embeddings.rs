//! Embedding generation via the messages backend.
//!
//! The backend is prompted to return only a JSON array of exactly
//! `dimensions` numbers. Responses are defensively cleaned (code fences,
//! stray whitespace) and then validated in stages, each failing fast with a
//! distinct error: parseable array, exact length, every element finite and
//! in [-1, 1]. Validated vectors are rounded to 4 decimal places so that
//! repeated embedding of identical text yields byte-identical stored
//! vectors, modulo backend nondeterminism.

use notelink_core::{AppError, AppResult};
use notelink_llm::{retry_with_backoff, MessagesClient, RetryPolicy};

/// Input text is truncated to this many characters before sending, to
/// respect backend payload limits. A deliberate lossy-but-bounded-cost
/// tradeoff: callers must not assume full-text fidelity in the vector.
const MAX_INPUT_CHARS: usize = 500;

/// Token budget for the embedding response.
const MAX_TOKENS: u32 = 1024;

/// Decimal places kept when canonicalizing vector elements.
const ROUND_DECIMALS: i32 = 4;

/// Generates fixed-dimensionality embedding vectors for text chunks.
#[derive(Debug, Clone)]
pub struct EmbeddingClient {
    client: MessagesClient,
    dimensions: usize,
    retry: RetryPolicy,
}

impl EmbeddingClient {
    pub fn new(client: MessagesClient, dimensions: usize) -> Self {
        Self {
            client,
            dimensions,
            retry: RetryPolicy::default(),
        }
    }

    /// Override the retry policy (used by tests to avoid real backoff).
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Expected embedding dimension.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Embed a text chunk.
    ///
    /// Only the network call is retried, and only on rate limits; a
    /// malformed or invalid payload is never retried — callers decide
    /// whether to retry the whole operation.
    ///
    /// # Errors
    /// * `AppError::MalformedPayload` - response is not a JSON array
    /// * `AppError::Validation` - wrong length, non-finite or out-of-range
    ///   elements
    /// * errors from [`MessagesClient::complete`] otherwise
    pub async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let input = truncate_chars(text, MAX_INPUT_CHARS);
        let prompt = embedding_prompt(input, self.dimensions);

        let response = retry_with_backoff(
            || self.client.complete(&prompt, MAX_TOKENS),
            self.retry,
        )
        .await?;

        parse_embedding(&response, self.dimensions)
    }
}

/// Build the prompt asking for a bare JSON vector.
fn embedding_prompt(text: &str, dimensions: usize) -> String {
    format!(
        "Convert the following text into a semantic embedding vector. \
         Respond with ONLY a JSON array of exactly {dimensions} numbers \
         between -1 and 1, with no explanation, no markdown, and no code \
         fences.\n\nText: {text}"
    )
}

/// Truncate to a character-bounded prefix without splitting a code point.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Strip code-fence markers and surrounding whitespace from a payload.
///
/// The backend is told not to fence its output, but does anyway often
/// enough that this must be handled.
pub(crate) fn strip_code_fences(payload: &str) -> &str {
    let trimmed = payload.trim();

    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop an optional language tag after the opening fence
    let rest = rest
        .split_once('\n')
        .map(|(_, body)| body)
        .unwrap_or(rest);

    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Parse and validate an embedding payload.
///
/// Stages, each with a distinct error:
/// 1. parseable as a JSON array of numbers (`MalformedPayload`)
/// 2. length exactly `dimensions` (`Validation`)
/// 3. every element finite and in [-1, 1] (`Validation`)
///
/// On success every element is rounded to 4 decimal places.
pub(crate) fn parse_embedding(payload: &str, dimensions: usize) -> AppResult<Vec<f32>> {
    let cleaned = strip_code_fences(payload);

    let values: Vec<f64> = serde_json::from_str(cleaned).map_err(|e| {
        AppError::MalformedPayload(format!("Embedding payload is not a JSON array: {}", e))
    })?;

    if values.len() != dimensions {
        return Err(AppError::Validation(format!(
            "Embedding has {} elements, expected exactly {}",
            values.len(),
            dimensions
        )));
    }

    for (i, &value) in values.iter().enumerate() {
        if !value.is_finite() {
            return Err(AppError::Validation(format!(
                "Embedding element {} is not a finite number",
                i
            )));
        }
        if !(-1.0..=1.0).contains(&value) {
            return Err(AppError::Validation(format!(
                "Embedding element {} is out of range [-1, 1]: {}",
                i, value
            )));
        }
    }

    Ok(values.into_iter().map(|v| round_element(v as f32)).collect())
}

/// Round an element to the canonical storage precision.
fn round_element(value: f32) -> f32 {
    let factor = 10f32.powi(ROUND_DECIMALS);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 3), "hel");
        // Multibyte characters are not split
        assert_eq!(truncate_chars("héllo", 2), "hé");
    }

    #[test]
    fn test_strip_code_fences_plain() {
        assert_eq!(strip_code_fences("  [1, 2]  "), "[1, 2]");
    }

    #[test]
    fn test_strip_code_fences_fenced() {
        assert_eq!(strip_code_fences("```\n[1, 2]\n```"), "[1, 2]");
        assert_eq!(strip_code_fences("```json\n[1, 2]\n```"), "[1, 2]");
    }

    #[test]
    fn test_parse_valid_embedding() {
        let payload = "[0.5, -0.25, 0.0]";
        let embedding = parse_embedding(payload, 3).unwrap();
        assert_eq!(embedding, vec![0.5, -0.25, 0.0]);
    }

    #[test]
    fn test_parse_rounds_to_four_decimals() {
        let payload = "[0.123456, -0.999999]";
        let embedding = parse_embedding(payload, 2).unwrap();
        assert_eq!(embedding, vec![0.1235, -1.0]);
    }

    #[test]
    fn test_parse_fenced_embedding() {
        let payload = "```json\n[1.0, -1.0]\n```";
        let embedding = parse_embedding(payload, 2).unwrap();
        assert_eq!(embedding, vec![1.0, -1.0]);
    }

    #[test]
    fn test_reject_non_array() {
        let err = parse_embedding("not json at all", 3).unwrap_err();
        assert!(matches!(err, AppError::MalformedPayload(_)));

        let err = parse_embedding(r#"{"vector": [1, 2, 3]}"#, 3).unwrap_err();
        assert!(matches!(err, AppError::MalformedPayload(_)));
    }

    #[test]
    fn test_reject_wrong_length() {
        let err = parse_embedding("[0.1, 0.2]", 3).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = parse_embedding("[0.1, 0.2, 0.3, 0.4]", 3).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_reject_out_of_range() {
        let err = parse_embedding("[0.1, 1.5, 0.3]", 3).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = parse_embedding("[-1.0001, 0.0, 0.0]", 3).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_reject_non_numeric_element() {
        let err = parse_embedding(r#"[0.1, "two", 0.3]"#, 3).unwrap_err();
        assert!(matches!(err, AppError::MalformedPayload(_)));
    }

    #[test]
    fn test_boundary_values_accepted() {
        let embedding = parse_embedding("[1.0, -1.0, 0.0]", 3).unwrap();
        assert_eq!(embedding, vec![1.0, -1.0, 0.0]);
    }

    #[test]
    fn test_prompt_names_dimension() {
        let prompt = embedding_prompt("some text", 64);
        assert!(prompt.contains("exactly 64 numbers"));
        assert!(prompt.contains("some text"));
    }
}
