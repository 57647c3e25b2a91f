//! Linking engine type definitions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub use notelink_llm::transcribe::TranscriptSegment;

/// A bounded-size contiguous slice of a transcript, anchored to the start
/// timestamp of its first segment.
///
/// Chunks are ephemeral: created once per processing run and persisted only
/// in vectorized form.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    /// Chunk text (non-empty, trimmed)
    pub text: String,

    /// Start of the first contributing segment, in seconds
    pub start_time: f64,
}

/// A persisted (text, vector, source note, timestamp) record.
///
/// Invariants: `embedding.len()` equals the configured dimension, every
/// element is finite and in [-1, 1], and elements are rounded to 4 decimal
/// places before storage. Records are append-only, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingRecord {
    /// Chunk text this vector was derived from
    pub text: String,

    /// Fixed-length embedding vector
    pub embedding: Vec<f32>,

    /// Stable identifier of the note the chunk came from
    #[serde(rename = "sourceNote")]
    pub source_note: String,

    /// Chunk start time in seconds, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
}

/// A store record paired with its similarity to a query vector.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatch {
    /// The matched record
    pub record: EmbeddingRecord,

    /// Cosine similarity to the query, in [-1, 1]
    pub similarity: f32,
}

/// Per-related-note summary of one or more similarity matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionSummary {
    /// The related note's identifier
    #[serde(rename = "sourceNote")]
    pub source_note: String,

    /// Highest similarity across this note's matches
    #[serde(rename = "maxSimilarity")]
    pub max_similarity: f32,

    /// Matched chunk texts, de-duplicated, insertion order.
    /// Rendering caps how many are shown; the summary keeps them all.
    pub snippets: Vec<String>,

    /// Shared concept labels, when concept tagging ran
    pub concepts: BTreeSet<String>,
}

impl ConnectionSummary {
    /// Start a summary from the first match for a note.
    pub fn new(source_note: impl Into<String>) -> Self {
        Self {
            source_note: source_note.into(),
            max_similarity: f32::NEG_INFINITY,
            snippets: Vec::new(),
            concepts: BTreeSet::new(),
        }
    }
}

/// Themes and summary extracted from a transcript.
///
/// A failed extraction degrades to empty themes and a placeholder summary
/// rather than aborting the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptAnalysis {
    #[serde(default)]
    pub themes: Vec<String>,

    #[serde(default)]
    pub summary: String,
}

impl TranscriptAnalysis {
    /// Degraded analysis used when extraction fails.
    pub fn degraded() -> Self {
        Self {
            themes: Vec::new(),
            summary: "Theme extraction failed for this video.".to_string(),
        }
    }
}

/// Outcome of one processing run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessOutcome {
    /// Video identifier that was processed
    #[serde(rename = "videoId")]
    pub video_id: String,

    /// Resolved (or placeholder) title
    pub title: String,

    /// Vault-relative path of the created note
    #[serde(rename = "notePath")]
    pub note_path: String,

    /// Number of chunks successfully embedded and stored
    #[serde(rename = "chunksStored")]
    pub chunks_stored: u32,

    /// Number of chunks skipped due to embedding failures
    #[serde(rename = "chunksSkipped")]
    pub chunks_skipped: u32,

    /// Connections discovered, ranked by descending similarity
    pub connections: Vec<ConnectionSummary>,

    /// Whether the run degraded (transcription or analysis failure)
    #[serde(default)]
    pub degraded: bool,

    /// Wall-clock duration in seconds
    #[serde(rename = "durationSecs")]
    pub duration_secs: f64,
}
