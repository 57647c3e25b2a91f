//! Transcript chunking.
//!
//! Splits a time-coded transcript into bounded-size text windows, each
//! anchored to the start timestamp of its first segment.

use crate::types::{Chunk, TranscriptSegment};

/// Split transcript segments into chunks of at most `max_chunk_size`
/// characters.
///
/// The bound is soft: it is checked before appending a segment, so a single
/// segment longer than `max_chunk_size` becomes a chunk on its own rather
/// than being split. Segment texts are joined with a single space and the
/// emitted chunk text is trimmed.
///
/// Pure and deterministic; an empty segment sequence yields no chunks.
pub fn chunk_transcript(segments: &[TranscriptSegment], max_chunk_size: usize) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut buffer = String::new();
    let mut current_start = segments.first().map_or(0.0, |s| s.start);

    for segment in segments {
        if !buffer.is_empty() && buffer.len() + segment.text.len() > max_chunk_size {
            let text = buffer.trim();
            if !text.is_empty() {
                chunks.push(Chunk {
                    text: text.to_string(),
                    start_time: current_start,
                });
            }
            buffer.clear();
            current_start = segment.start;
        }

        if !buffer.is_empty() {
            buffer.push(' ');
        }
        buffer.push_str(&segment.text);
    }

    if !buffer.trim().is_empty() {
        chunks.push(Chunk {
            text: buffer.trim().to_string(),
            start_time: current_start,
        });
    }

    tracing::debug!(
        "Chunked {} segments into {} chunks (max size: {})",
        segments.len(),
        chunks.len(),
        max_chunk_size
    );

    chunks
}
