//! `NotesQuery` capability: a narrow, read-only view onto user-authored
//! notes/corrections kept by an external notes service. The core never
//! writes notes, only reads them to decide whether a page's signature is
//! still sufficient (see `signature::Decision`).

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteScope {
    File,
    Directory,
    Workflow,
    General,
}

#[derive(Debug, Clone)]
pub struct Note {
    pub content: String,
    pub author: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Read-only collaborator supplying notes for a given scope/target.
pub trait NotesQuery: Send + Sync {
    /// Notes for `target` within `scope`, newest first.
    fn notes_for(&self, scope: NoteScope, target: &str) -> Vec<Note>;
}

/// Default implementation used when no notes backend is configured.
pub struct NullNotesQuery;

impl NotesQuery for NullNotesQuery {
    fn notes_for(&self, _scope: NoteScope, _target: &str) -> Vec<Note> {
        Vec::new()
    }
}

/// In-memory test double.
#[derive(Default)]
pub struct InMemoryNotesQuery {
    notes: Vec<(NoteScope, String, Note)>,
}

impl InMemoryNotesQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, scope: NoteScope, target: impl Into<String>, note: Note) {
        self.notes.push((scope, target.into(), note));
    }
}

impl NotesQuery for InMemoryNotesQuery {
    fn notes_for(&self, scope: NoteScope, target: &str) -> Vec<Note> {
        let mut matches: Vec<Note> = self
            .notes
            .iter()
            .filter(|(s, t, _)| *s == scope && t == target)
            .map(|(_, _, note)| note.clone())
            .collect();
        matches.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_notes_query_is_always_empty() {
        let notes = NullNotesQuery;
        assert!(notes.notes_for(NoteScope::File, "src/lib.rs").is_empty());
    }

    #[test]
    fn in_memory_notes_query_sorts_newest_first() {
        let mut notes = InMemoryNotesQuery::new();
        notes.add(
            NoteScope::File,
            "src/lib.rs",
            Note {
                content: "older".to_string(),
                author: None,
                updated_at: DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                    .unwrap()
                    .with_timezone(&Utc),
            },
        );
        notes.add(
            NoteScope::File,
            "src/lib.rs",
            Note {
                content: "newer".to_string(),
                author: None,
                updated_at: DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
                    .unwrap()
                    .with_timezone(&Utc),
            },
        );
        let found = notes.notes_for(NoteScope::File, "src/lib.rs");
        assert_eq!(found[0].content, "newer");
    }
}
