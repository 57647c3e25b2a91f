//! Ingest command handler.
//!
//! Runs the full processing pipeline for one video.

use clap::Args;
use notelink_core::{config::AppConfig, AppResult};
use notelink_linker::{FsNoteStore, Pipeline, VectorStore};

/// Process a video into a linked note
#[derive(Args, Debug)]
pub struct IngestCommand {
    /// Video identifier (e.g. a YouTube id)
    pub video_id: String,

    /// Use this title instead of looking one up
    #[arg(long)]
    pub title: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IngestCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ingest command for video '{}'", self.video_id);

        let pipeline = Pipeline::from_app_config(config)?;
        let store = VectorStore::open(config.store_path())?;
        let notes = FsNoteStore::new(&config.vault);

        let outcome = pipeline
            .process_video(&self.video_id, self.title.as_deref(), &store, &notes)
            .await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        } else {
            println!("Created note: {}", outcome.note_path);
            println!(
                "Stored {} chunks ({} skipped), found {} related notes in {:.2}s",
                outcome.chunks_stored,
                outcome.chunks_skipped,
                outcome.connections.len(),
                outcome.duration_secs
            );
            for connection in &outcome.connections {
                println!(
                    "  {} (similarity {:.0}%)",
                    connection.source_note,
                    connection.max_similarity * 100.0
                );
            }
            if outcome.degraded {
                println!("Warning: run degraded, see log for details");
            }
        }

        Ok(())
    }
}
