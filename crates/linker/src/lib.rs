//! Semantic linking engine.
//!
//! Turns a raw transcript into chunks, converts each chunk into a
//! fixed-length vector, persists those vectors, and retrieves near-duplicate
//! or topically related chunks from the growing corpus to build
//! bidirectional cross-references between notes.
//!
//! Data flow: transcript segments -> [`chunker`] -> chunks ->
//! [`embeddings`] -> vectors -> [`store`] (write) and similarity search
//! (read) -> [`connections`] -> per-note connection summaries ->
//! [`notes`] rendering.

pub mod chunker;
pub mod concepts;
pub mod connections;
pub mod embeddings;
pub mod notes;
pub mod pipeline;
pub mod similarity;
pub mod store;
pub mod themes;
pub mod types;


// Re-export commonly used types
pub use embeddings::EmbeddingClient;
pub use notes::{FsNoteStore, NoteStore};
pub use pipeline::{Pipeline, PipelineConfig};
pub use store::VectorStore;
pub use types::{
    Chunk, ConnectionSummary, EmbeddingRecord, ProcessOutcome, SimilarityMatch,
    TranscriptAnalysis, TranscriptSegment,
};
