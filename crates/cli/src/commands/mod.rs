//! Command handlers for the notelink CLI.

pub mod ingest;
pub mod related;
pub mod stats;

// Re-export command types for convenience
pub use ingest::IngestCommand;
pub use related::RelatedCommand;
pub use stats::StatsCommand;
