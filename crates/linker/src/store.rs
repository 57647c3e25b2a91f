//! Durable, append-only store for embedding records.
//!
//! The store owns the record collection and its persistence lifecycle: the
//! full collection is rehydrated into memory at open and mirrored to disk
//! on every append (write-through, no batching). The durable form is a
//! single JSON structure `{ "embeddings": [...] }`, rewritten wholesale.
//!
//! Similarity queries are an exact linear scan — O(n·D) per query, which is
//! acceptable at the target scale (a single-user knowledge base, thousands
//! of chunks rather than millions) and keeps results byte-for-byte
//! reproducible. Approximate nearest-neighbor indexing is an explicit
//! non-goal.

use crate::similarity::cosine_similarity;
use crate::types::{EmbeddingRecord, SimilarityMatch};
use notelink_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Durable form of the store.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    embeddings: Vec<EmbeddingRecord>,
}

/// Append-only vector store with write-through JSON persistence.
///
/// Appends are serialized through an interior mutex, so a shared reference
/// is sufficient for both reads and writes within a process. Records are
/// never mutated or deleted; unbounded growth is an accepted limitation at
/// this scale.
#[derive(Debug)]
pub struct VectorStore {
    path: PathBuf,
    records: Mutex<Vec<EmbeddingRecord>>,
}

impl VectorStore {
    /// Open a store at `path`, rehydrating any persisted records.
    ///
    /// A missing file yields an empty store; a present-but-unreadable file
    /// is an error (silently discarding a corpus would be worse than
    /// failing the run).
    pub fn open(path: impl Into<PathBuf>) -> AppResult<Self> {
        let path = path.into();

        let records = if path.exists() {
            let contents = std::fs::read_to_string(&path).map_err(|e| {
                AppError::Store(format!("Failed to read store at {:?}: {}", path, e))
            })?;

            let file: StoreFile = serde_json::from_str(&contents).map_err(|e| {
                AppError::Store(format!("Failed to parse store at {:?}: {}", path, e))
            })?;

            tracing::debug!("Loaded {} embedding records from {:?}", file.embeddings.len(), path);
            file.embeddings
        } else {
            tracing::debug!("No store file at {:?}, starting empty", path);
            Vec::new()
        };

        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    /// Append a record and write the store through to disk.
    ///
    /// A persistence failure is logged and does not roll back the
    /// in-memory append: the record stays queryable for the rest of the
    /// process lifetime (availability over durability).
    pub fn add(&self, record: EmbeddingRecord) {
        let mut records = self.records.lock().expect("store mutex poisoned");
        records.push(record);

        if let Err(e) = self.save(&records) {
            tracing::warn!(
                "Failed to persist vector store to {:?}: {} (record kept in memory)",
                self.path,
                e
            );
        }
    }

    /// Find records with cosine similarity strictly greater than `threshold`,
    /// ordered by descending similarity.
    ///
    /// The sort is stable, so equal similarities preserve insertion order.
    pub fn find_similar(&self, query: &[f32], threshold: f32) -> Vec<SimilarityMatch> {
        let records = self.records.lock().expect("store mutex poisoned");

        let mut matches: Vec<SimilarityMatch> = records
            .iter()
            .map(|record| SimilarityMatch {
                similarity: cosine_similarity(query, &record.embedding),
                record: record.clone(),
            })
            .filter(|m| m.similarity > threshold)
            .collect();

        matches.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        tracing::debug!(
            "Similarity query matched {} of {} records (threshold: {})",
            matches.len(),
            records.len(),
            threshold
        );

        matches
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.lock().expect("store mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of distinct source notes across all records.
    pub fn note_count(&self) -> usize {
        let records = self.records.lock().expect("store mutex poisoned");
        let mut notes: Vec<&str> = records.iter().map(|r| r.source_note.as_str()).collect();
        notes.sort_unstable();
        notes.dedup();
        notes.len()
    }

    /// Path of the durable store file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the whole collection to disk.
    fn save(&self, records: &[EmbeddingRecord]) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::Store(format!("Failed to create store directory: {}", e))
            })?;
        }

        let file = StoreFile {
            embeddings: records.to_vec(),
        };

        let json = serde_json::to_string(&file)
            .map_err(|e| AppError::Store(format!("Failed to serialize store: {}", e)))?;

        std::fs::write(&self.path, json)
            .map_err(|e| AppError::Store(format!("Failed to write store: {}", e)))?;

        Ok(())
    }
}
