//! Backend clients for notelink.
//!
//! This crate wraps the three external collaborators behind narrow
//! request/response contracts:
//! - **Messages backend**: the text-analysis API used for embeddings,
//!   theme extraction, and concept tagging.
//! - **Transcription backend**: turns a video id into time-coded segments.
//! - **oEmbed**: video title lookup with a placeholder fallback.
//!
//! It also provides the cross-cutting retry helper for rate-limited calls.

pub mod messages;
pub mod oembed;
pub mod retry;
pub mod transcribe;

// Re-export main types
pub use messages::MessagesClient;
pub use oembed::OembedClient;
pub use retry::{retry_with_backoff, RetryPolicy};
pub use transcribe::{TranscriptSegment, TranscriptionClient};
