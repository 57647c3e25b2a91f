//! The processing run: transcript to linked note.
//!
//! One run proceeds strictly sequentially: transcribe, resolve the title,
//! analyze themes, chunk, then for each chunk embed, query the store, and
//! append. The sequencing is intentional: embedding calls are network
//! round-trips against a rate-limited backend, and one-at-a-time requests
//! keep the chunk-to-record correspondence in the store deterministic.
//!
//! Failure policy (partial success over total failure):
//! - chunk-level embedding failures are logged and the chunk is skipped
//! - theme extraction failures degrade to a placeholder analysis
//! - a transcription failure still produces a title and a note, marked
//!   degraded, with no connections

use crate::chunker::chunk_transcript;
use crate::concepts::ConceptTagger;
use crate::connections::{aggregate, merge_concepts, ranked};
use crate::embeddings::EmbeddingClient;
use crate::notes::{append_backlink, note_file_name, render_note, NoteStore};
use crate::store::VectorStore;
use crate::themes::ThemeExtractor;
use crate::types::{EmbeddingRecord, ProcessOutcome, SimilarityMatch, TranscriptAnalysis};
use notelink_core::{AppConfig, AppResult};
use notelink_llm::{MessagesClient, OembedClient, TranscriptionClient};
use std::time::Instant;

/// Linking parameters for a processing run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Maximum chunk size in characters
    pub chunk_size: usize,

    /// Strict lower bound on connection similarity
    pub similarity_threshold: f32,

    /// Vault subfolder for generated notes
    pub notes_folder: String,

    /// Whether to run concept tagging over the chunks
    pub tag_concepts: bool,
}

/// Orchestrates a full processing run for one video.
pub struct Pipeline {
    transcription: TranscriptionClient,
    oembed: OembedClient,
    embeddings: EmbeddingClient,
    themes: ThemeExtractor,
    concepts: ConceptTagger,
    config: PipelineConfig,
}

impl Pipeline {
    /// Build a pipeline from the application configuration.
    ///
    /// Calls [`AppConfig::validate`] first, so a missing API key fails here
    /// rather than mid-run.
    pub fn from_app_config(config: &AppConfig) -> AppResult<Self> {
        config.validate()?;

        let api_key = config.api_key.clone().unwrap_or_default();
        let messages =
            MessagesClient::new(&config.messages_endpoint, api_key, &config.model)?;

        Ok(Self {
            transcription: TranscriptionClient::new(&config.transcription_endpoint)?,
            oembed: OembedClient::new(&config.oembed_endpoint)?,
            embeddings: EmbeddingClient::new(messages.clone(), config.embedding_dim),
            themes: ThemeExtractor::new(messages.clone()),
            concepts: ConceptTagger::new(messages),
            config: PipelineConfig {
                chunk_size: config.chunk_size,
                similarity_threshold: config.similarity_threshold,
                notes_folder: config.notes_folder.clone(),
                tag_concepts: true,
            },
        })
    }

    /// Process one video end to end: transcribe, link, and write the note.
    pub async fn process_video(
        &self,
        video_id: &str,
        title_override: Option<&str>,
        store: &VectorStore,
        notes: &dyn NoteStore,
    ) -> AppResult<ProcessOutcome> {
        let start = Instant::now();

        let title = match title_override {
            Some(title) => title.to_string(),
            None => self.oembed.title(video_id).await,
        };

        notes.create_folder(&self.config.notes_folder)?;
        let note_id = format!(
            "{}/{}",
            self.config.notes_folder,
            note_file_name(&title, video_id)
        );

        tracing::info!("Processing video '{}' into note '{}'", video_id, note_id);

        let transcript = match self.transcription.transcribe(video_id).await {
            Ok(result) => result,
            Err(e) => {
                // Degraded run: a title and a note still get created
                tracing::error!("Transcription failed for '{}': {}", video_id, e);
                let analysis = TranscriptAnalysis {
                    themes: Vec::new(),
                    summary: "Transcription failed for this video.".to_string(),
                };
                let text = render_note(video_id, &title, &analysis, &[]);
                notes.write(&note_id, &text)?;

                return Ok(ProcessOutcome {
                    video_id: video_id.to_string(),
                    title,
                    note_path: note_id,
                    chunks_stored: 0,
                    chunks_skipped: 0,
                    connections: Vec::new(),
                    degraded: true,
                    duration_secs: start.elapsed().as_secs_f64(),
                });
            }
        };

        let full_text: String = transcript
            .segments
            .iter()
            .map(|s| s.text.trim())
            .collect::<Vec<_>>()
            .join(" ");

        let analysis = self.themes.analyze(&full_text).await;

        let chunks = chunk_transcript(&transcript.segments, self.config.chunk_size);
        tracing::info!("Transcript yielded {} chunks", chunks.len());

        let mut matches_by_chunk: Vec<Vec<SimilarityMatch>> = Vec::new();
        let mut stored_texts: Vec<String> = Vec::new();
        let mut chunks_skipped = 0u32;

        // One chunk at a time, query before append: a chunk never matches
        // records stored later in the same run, and the store's record order
        // mirrors chunk order exactly.
        for chunk in &chunks {
            let embedding = match self.embeddings.embed(&chunk.text).await {
                Ok(embedding) => embedding,
                Err(e) => {
                    tracing::warn!(
                        "Skipping chunk at {:.1}s, embedding failed: {}",
                        chunk.start_time,
                        e
                    );
                    chunks_skipped += 1;
                    continue;
                }
            };

            matches_by_chunk.push(store.find_similar(&embedding, self.config.similarity_threshold));

            store.add(EmbeddingRecord {
                text: chunk.text.clone(),
                embedding,
                source_note: note_id.clone(),
                timestamp: Some(chunk.start_time),
            });
            stored_texts.push(chunk.text.clone());
        }

        let all_matches: Vec<SimilarityMatch> =
            matches_by_chunk.iter().flatten().cloned().collect();
        let mut summaries = aggregate(&all_matches, &note_id);

        if self.config.tag_concepts && !summaries.is_empty() {
            // Labels come back aligned with stored_texts, which is aligned
            // with matches_by_chunk: skipped chunks entered neither list
            let labels = self.concepts.tag_chunks(&stored_texts).await;
            merge_concepts(&mut summaries, &matches_by_chunk, &labels);
        }

        let connections = ranked(summaries);

        let text = render_note(video_id, &title, &analysis, &connections);
        notes.write(&note_id, &text)?;

        // Bidirectional cross-references: each related note links back
        for connection in &connections {
            if !notes.exists(&connection.source_note) {
                continue;
            }
            if let Err(e) =
                append_backlink(notes, &connection.source_note, &note_id, connection.max_similarity)
            {
                tracing::warn!(
                    "Failed to add backlink to '{}': {}",
                    connection.source_note,
                    e
                );
            }
        }

        let outcome = ProcessOutcome {
            video_id: video_id.to_string(),
            title,
            note_path: note_id,
            chunks_stored: stored_texts.len() as u32,
            chunks_skipped,
            connections,
            degraded: false,
            duration_secs: start.elapsed().as_secs_f64(),
        };

        tracing::info!(
            "Processed '{}': {} chunks stored, {} skipped, {} connections in {:.2}s",
            video_id,
            outcome.chunks_stored,
            outcome.chunks_skipped,
            outcome.connections.len(),
            outcome.duration_secs
        );

        Ok(outcome)
    }
}
