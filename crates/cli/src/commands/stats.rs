//! Stats command handler.
//!
//! Shows vector store statistics.

use clap::Args;
use notelink_core::{config::AppConfig, AppResult};
use notelink_linker::VectorStore;

/// Show vector store statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing stats command");

        let store = VectorStore::open(config.store_path())?;

        let file_bytes = std::fs::metadata(store.path())
            .map(|m| m.len())
            .unwrap_or(0);

        if self.json {
            let output = serde_json::json!({
                "records": store.len(),
                "notes": store.note_count(),
                "storePath": store.path().display().to_string(),
                "storeBytes": file_bytes,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("Store: {}", store.path().display());
            println!("Records: {}", store.len());
            println!("Notes: {}", store.note_count());
            println!("Size: {} bytes", file_bytes);
        }

        Ok(())
    }
}
