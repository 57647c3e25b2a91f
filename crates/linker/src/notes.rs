//! Note storage and rendering.
//!
//! The engine never touches the host's document model directly; it goes
//! through the narrow [`NoteStore`] trait. [`FsNoteStore`] is the plain
//! filesystem implementation used by the CLI, with note ids as
//! vault-relative paths.

use crate::types::{ConnectionSummary, TranscriptAnalysis};
use notelink_core::{AppError, AppResult};
use std::path::{Path, PathBuf};

/// Evidence snippets shown per connection when rendering. The aggregator
/// keeps all snippets; this cap is purely presentational.
const SNIPPET_CAP: usize = 3;

/// Narrow storage contract for the host note environment.
pub trait NoteStore {
    /// Read a note's full text.
    fn read(&self, id: &str) -> AppResult<String>;

    /// Write (create or overwrite) a note.
    fn write(&self, id: &str, text: &str) -> AppResult<()>;

    /// Whether a note exists.
    fn exists(&self, id: &str) -> bool;

    /// Ensure a folder exists.
    fn create_folder(&self, path: &str) -> AppResult<()>;
}

/// Filesystem-backed note store rooted at the vault directory.
#[derive(Debug, Clone)]
pub struct FsNoteStore {
    root: PathBuf,
}

impl FsNoteStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, id: &str) -> PathBuf {
        self.root.join(id)
    }
}

impl NoteStore for FsNoteStore {
    fn read(&self, id: &str) -> AppResult<String> {
        std::fs::read_to_string(self.resolve(id))
            .map_err(|e| AppError::Note(format!("Failed to read note '{}': {}", id, e)))
    }

    fn write(&self, id: &str, text: &str) -> AppResult<()> {
        let path = self.resolve(id);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::Note(format!("Failed to create note folder: {}", e)))?;
        }
        std::fs::write(&path, text)
            .map_err(|e| AppError::Note(format!("Failed to write note '{}': {}", id, e)))
    }

    fn exists(&self, id: &str) -> bool {
        self.resolve(id).exists()
    }

    fn create_folder(&self, path: &str) -> AppResult<()> {
        std::fs::create_dir_all(self.resolve(path))
            .map_err(|e| AppError::Note(format!("Failed to create folder '{}': {}", path, e)))
    }
}

/// The wiki-link target for a note id: file stem without the extension.
pub fn note_link_target(note_id: &str) -> &str {
    let stem = note_id.rsplit('/').next().unwrap_or(note_id);
    stem.strip_suffix(".md").unwrap_or(stem)
}

/// Sanitize a title into a filename.
///
/// Falls back to `fallback` when nothing survives sanitization, so a title
/// made entirely of forbidden characters cannot produce an extension-only
/// file name.
pub fn note_file_name(title: &str, fallback: &str) -> String {
    let cleaned: String = title
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => ' ',
            _ => c,
        })
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        format!("{}.md", fallback)
    } else {
        format!("{}.md", cleaned)
    }
}

/// Render the full markdown note for a processed video.
pub fn render_note(
    video_id: &str,
    title: &str,
    analysis: &TranscriptAnalysis,
    connections: &[ConnectionSummary],
) -> String {
    let mut out = String::new();

    out.push_str(&format!("# {}\n\n", title));
    out.push_str(&format!(
        "Source: https://www.youtube.com/watch?v={}\n\n",
        video_id
    ));

    if !analysis.themes.is_empty() {
        out.push_str("## Themes\n\n");
        for theme in &analysis.themes {
            out.push_str(&format!("- {}\n", theme));
        }
        out.push('\n');
    }

    if !analysis.summary.is_empty() {
        out.push_str("## Summary\n\n");
        out.push_str(&analysis.summary);
        out.push_str("\n\n");
    }

    out.push_str(&render_connections_section(connections));
    out
}

/// Render the "Related Notes" section.
fn render_connections_section(connections: &[ConnectionSummary]) -> String {
    let mut out = String::from("## Related Notes\n\n");

    if connections.is_empty() {
        out.push_str("No related notes found.\n");
        return out;
    }

    for connection in connections {
        out.push_str(&format!(
            "- [[{}]] (similarity {:.0}%)\n",
            note_link_target(&connection.source_note),
            connection.max_similarity * 100.0
        ));

        for snippet in connection.snippets.iter().take(SNIPPET_CAP) {
            out.push_str(&format!("    - \"{}\"\n", snippet));
        }

        if !connection.concepts.is_empty() {
            let concepts: Vec<&str> = connection.concepts.iter().map(String::as_str).collect();
            out.push_str(&format!("    - Concepts: {}\n", concepts.join(", ")));
        }
    }

    out
}

/// Add a backlink to a related note, if it does not already link back.
///
/// Inserts at the end of the note's "## Related Notes" section, before any
/// later heading, creating the section at the end when missing. Idempotent:
/// an existing wiki link to the current note leaves the related note
/// untouched.
pub fn append_backlink(
    store: &dyn NoteStore,
    related_note_id: &str,
    current_note_id: &str,
    similarity: f32,
) -> AppResult<()> {
    const HEADING: &str = "## Related Notes";

    let target = note_link_target(current_note_id);
    let link = format!("[[{}]]", target);

    let mut text = store.read(related_note_id)?;

    if text.contains(&link) {
        return Ok(());
    }

    let entry = format!("- {} (similarity {:.0}%)\n", link, similarity * 100.0);

    let updated = match text.find(HEADING) {
        None => {
            if !text.ends_with('\n') {
                text.push('\n');
            }
            text.push_str("\n## Related Notes\n\n");
            text.push_str(&entry);
            text
        }
        Some(pos) => {
            // The section runs until the next heading or end of file
            let after_heading = pos + HEADING.len();
            let section_end = text[after_heading..]
                .find("\n## ")
                .map(|i| after_heading + i + 1)
                .unwrap_or(text.len());

            let mut updated = String::with_capacity(text.len() + entry.len() + 1);
            updated.push_str(&text[..section_end]);
            if !updated.ends_with('\n') {
                updated.push('\n');
            }
            updated.push_str(&entry);
            updated.push_str(&text[section_end..]);
            updated
        }
    };

    store.write(related_note_id, &updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    fn connection(note: &str, similarity: f32, snippets: &[&str]) -> ConnectionSummary {
        ConnectionSummary {
            source_note: note.to_string(),
            max_similarity: similarity,
            snippets: snippets.iter().map(|s| s.to_string()).collect(),
            concepts: BTreeSet::new(),
        }
    }

    #[test]
    fn test_note_link_target() {
        assert_eq!(note_link_target("YouTube Notes/My Video.md"), "My Video");
        assert_eq!(note_link_target("Flat.md"), "Flat");
        assert_eq!(note_link_target("NoExtension"), "NoExtension");
    }

    #[test]
    fn test_note_file_name_sanitized() {
        assert_eq!(
            note_file_name("Rust: Fearless? \"Concurrency\"", "abc123"),
            "Rust  Fearless   Concurrency.md"
        );
    }

    #[test]
    fn test_note_file_name_falls_back_when_title_unusable() {
        assert_eq!(note_file_name("???", "abc123"), "abc123.md");
        assert_eq!(note_file_name("   ", "abc123"), "abc123.md");
    }

    #[test]
    fn test_render_note_sections() {
        let analysis = TranscriptAnalysis {
            themes: vec!["ownership".to_string()],
            summary: "A talk.".to_string(),
        };
        let connections = vec![connection("Notes/Other.md", 0.87, &["evidence"])];

        let note = render_note("abc123", "My Talk", &analysis, &connections);

        assert!(note.starts_with("# My Talk\n"));
        assert!(note.contains("https://www.youtube.com/watch?v=abc123"));
        assert!(note.contains("## Themes\n\n- ownership"));
        assert!(note.contains("## Summary\n\nA talk."));
        assert!(note.contains("- [[Other]] (similarity 87%)"));
        assert!(note.contains("    - \"evidence\""));
    }

    #[test]
    fn test_render_caps_snippets_at_three() {
        let connections = vec![connection(
            "Notes/Other.md",
            0.9,
            &["one", "two", "three", "four"],
        )];

        let section = render_connections_section(&connections);

        assert!(section.contains("\"three\""));
        assert!(!section.contains("\"four\""));
    }

    #[test]
    fn test_render_empty_connections() {
        let section = render_connections_section(&[]);
        assert!(section.contains("No related notes found."));
    }

    #[test]
    fn test_fs_note_store_round_trip() {
        let temp = TempDir::new().unwrap();
        let store = FsNoteStore::new(temp.path());

        assert!(!store.exists("Notes/A.md"));
        store.write("Notes/A.md", "# A\n").unwrap();
        assert!(store.exists("Notes/A.md"));
        assert_eq!(store.read("Notes/A.md").unwrap(), "# A\n");
    }

    #[test]
    fn test_append_backlink_creates_section() {
        let temp = TempDir::new().unwrap();
        let store = FsNoteStore::new(temp.path());
        store.write("Old.md", "# Old\n\nBody text.\n").unwrap();

        append_backlink(&store, "Old.md", "Notes/New.md", 0.91).unwrap();

        let text = store.read("Old.md").unwrap();
        assert!(text.contains("## Related Notes"));
        assert!(text.contains("- [[New]] (similarity 91%)"));
    }

    #[test]
    fn test_append_backlink_idempotent() {
        let temp = TempDir::new().unwrap();
        let store = FsNoteStore::new(temp.path());
        store.write("Old.md", "# Old\n").unwrap();

        append_backlink(&store, "Old.md", "New.md", 0.9).unwrap();
        let first = store.read("Old.md").unwrap();

        append_backlink(&store, "Old.md", "New.md", 0.9).unwrap();
        let second = store.read("Old.md").unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_append_backlink_appends_to_existing_section() {
        let temp = TempDir::new().unwrap();
        let store = FsNoteStore::new(temp.path());
        store
            .write("Old.md", "# Old\n\n## Related Notes\n\n- [[Earlier]] (similarity 80%)\n")
            .unwrap();

        append_backlink(&store, "Old.md", "New.md", 0.85).unwrap();

        let text = store.read("Old.md").unwrap();
        assert!(text.contains("[[Earlier]]"));
        assert!(text.contains("- [[New]] (similarity 85%)"));
        // Only one section heading
        assert_eq!(text.matches("## Related Notes").count(), 1);
    }

    #[test]
    fn test_append_backlink_stays_inside_section() {
        // Hand-edited notes may have sections after Related Notes; the
        // backlink belongs before the next heading, not at end of file
        let temp = TempDir::new().unwrap();
        let store = FsNoteStore::new(temp.path());
        store
            .write(
                "Old.md",
                "# Old\n\n## Related Notes\n\n- [[Earlier]] (similarity 80%)\n\n## Transcript\n\nRaw text.\n",
            )
            .unwrap();

        append_backlink(&store, "Old.md", "New.md", 0.85).unwrap();

        let text = store.read("Old.md").unwrap();
        let link_pos = text.find("[[New]]").unwrap();
        let next_heading_pos = text.find("## Transcript").unwrap();
        assert!(link_pos < next_heading_pos);
        assert!(text.ends_with("Raw text.\n"));
    }
}
