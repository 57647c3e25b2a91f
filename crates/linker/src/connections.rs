//! Aggregation of per-chunk similarity matches into per-note connections.

use crate::types::{ConnectionSummary, SimilarityMatch};
use std::collections::BTreeMap;

/// Merge similarity matches into per-note connection summaries.
///
/// Matches whose source note equals `exclude_note` are discarded — a note
/// must never be reported as related to itself. Remaining matches are
/// grouped by source note; within a group, `max_similarity` is the maximum
/// seen, and snippets accumulate de-duplicated in match order. Concept tags
/// are merged separately via [`merge_concepts`] once tagging has run.
pub fn aggregate(
    matches: &[SimilarityMatch],
    exclude_note: &str,
) -> BTreeMap<String, ConnectionSummary> {
    let mut summaries: BTreeMap<String, ConnectionSummary> = BTreeMap::new();

    for m in matches {
        if m.record.source_note == exclude_note {
            continue;
        }

        let summary = summaries
            .entry(m.record.source_note.clone())
            .or_insert_with(|| ConnectionSummary::new(&m.record.source_note));

        if m.similarity > summary.max_similarity {
            summary.max_similarity = m.similarity;
        }

        if !summary.snippets.contains(&m.record.text) {
            summary.snippets.push(m.record.text.clone());
        }
    }

    summaries
}

/// Union each chunk's concept labels into the summaries of the notes that
/// chunk matched.
///
/// `matches_by_chunk` and `labels_by_chunk` are aligned index-for-index, so
/// a connection accumulates only the concepts of the chunks that actually
/// linked to it. Matches whose note has no summary (the excluded self-note)
/// contribute nothing.
pub fn merge_concepts(
    summaries: &mut BTreeMap<String, ConnectionSummary>,
    matches_by_chunk: &[Vec<SimilarityMatch>],
    labels_by_chunk: &[Vec<String>],
) {
    for (matches, labels) in matches_by_chunk.iter().zip(labels_by_chunk) {
        if labels.is_empty() {
            continue;
        }
        for m in matches {
            if let Some(summary) = summaries.get_mut(&m.record.source_note) {
                summary.concepts.extend(labels.iter().cloned());
            }
        }
    }
}

/// Order summaries by descending max similarity for presentation.
pub fn ranked(summaries: BTreeMap<String, ConnectionSummary>) -> Vec<ConnectionSummary> {
    let mut list: Vec<ConnectionSummary> = summaries.into_values().collect();
    list.sort_by(|a, b| {
        b.max_similarity
            .partial_cmp(&a.max_similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    list
}
