//! Related command handler.
//!
//! Embeds ad-hoc text and ranks matching notes from the store.

use clap::Args;
use notelink_core::{config::AppConfig, AppResult};
use notelink_linker::connections::{aggregate, ranked};
use notelink_linker::{EmbeddingClient, VectorStore};
use notelink_llm::MessagesClient;

/// Find notes related to ad-hoc text
#[derive(Args, Debug)]
pub struct RelatedCommand {
    /// Text to match against the stored corpus
    pub text: String,

    /// Similarity threshold override (strict greater-than)
    #[arg(short, long)]
    pub threshold: Option<f32>,

    /// Maximum notes to print
    #[arg(short, long, default_value = "10")]
    pub limit: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl RelatedCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing related command");

        config.validate()?;

        let messages = MessagesClient::new(
            &config.messages_endpoint,
            config.api_key.clone().unwrap_or_default(),
            &config.model,
        )?;
        let embeddings = EmbeddingClient::new(messages, config.embedding_dim);
        let store = VectorStore::open(config.store_path())?;

        let threshold = self.threshold.unwrap_or(config.similarity_threshold);

        let query = embeddings.embed(&self.text).await?;
        let matches = store.find_similar(&query, threshold);

        // No note is "current" for an ad-hoc query, so nothing is excluded
        let mut connections = ranked(aggregate(&matches, ""));
        connections.truncate(self.limit);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&connections)?);
        } else if connections.is_empty() {
            println!("No related notes above threshold {}", threshold);
        } else {
            for connection in &connections {
                println!(
                    "{} (similarity {:.0}%)",
                    connection.source_note,
                    connection.max_similarity * 100.0
                );
                for snippet in connection.snippets.iter().take(2) {
                    println!("    \"{}\"", snippet);
                }
            }
        }

        Ok(())
    }
}
