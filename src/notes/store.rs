//! Note store: lifecycle operations, ordering policy, current-note
//! selection, and persistence triggering.
//!
//! All operations run to completion synchronously on the caller's thread.
//! Missing-id operations are silent no-ops; the store never presents zero
//! notes as a steady state.

use std::cmp::Ordering;
use std::path::PathBuf;

use chrono::Utc;
use tracing::{debug, error, info};

use crate::document::Document;
use crate::error::ResultExt;

use super::model::{Note, NoteId};
use super::snapshot;

/// Canonical order: pinned notes before unpinned, then most recently
/// updated first. Stable, so equal-timestamp notes never visibly reorder.
fn canonical_sort(notes: &mut [Note]) {
    notes.sort_by(|a, b| match (a.pinned, b.pinned) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => b.updated_at.cmp(&a.updated_at),
    });
}

/// The system of record for notes.
pub struct NoteStore {
    notes: Vec<Note>,
    current_note_id: Option<NoteId>,
    snapshot_path: PathBuf,
}

impl NoteStore {
    /// Load the store from the snapshot at `snapshot_path`.
    ///
    /// A missing or empty snapshot synthesizes one fresh note. An
    /// unreadable snapshot is moved aside to a `.corrupt` sidecar and the
    /// store resets to a single fresh note - lossy in memory, lossless on
    /// disk.
    pub fn load(snapshot_path: PathBuf) -> Self {
        let mut store = NoteStore {
            notes: Vec::new(),
            current_note_id: None,
            snapshot_path,
        };

        match snapshot::read(&store.snapshot_path) {
            Ok(Some(mut notes)) if !notes.is_empty() => {
                canonical_sort(&mut notes);
                store.current_note_id = Some(notes[0].id);
                let count = notes.len();
                store.notes = notes;
                info!(count, "Notes loaded from snapshot");
            }
            Ok(_) => {
                store.create_note();
                info!("No snapshot, started with a fresh note");
            }
            Err(e) => {
                error!(error = %e, "Snapshot unreadable, resetting to a fresh note");
                snapshot::quarantine(&store.snapshot_path).log_err();
                store.create_note();
            }
        }

        store
    }

    // ---- Read side ----

    /// Notes in their presented order.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn get(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    pub fn current_note_id(&self) -> Option<NoteId> {
        self.current_note_id
    }

    pub fn current_note(&self) -> Option<&Note> {
        self.current_note_id.and_then(|id| self.get(id))
    }

    /// Case-insensitive substring filter over title and body, preserving
    /// the presented order. Empty terms match everything.
    pub fn browse(&self, filter: &str) -> Vec<&Note> {
        let needle = filter.trim().to_lowercase();
        self.notes
            .iter()
            .filter(|note| {
                needle.is_empty()
                    || note.title.to_lowercase().contains(&needle)
                    || note.content.plain_text().to_lowercase().contains(&needle)
            })
            .collect()
    }

    // ---- Mutations ----

    /// Create a fresh untitled note, spliced immediately after the last
    /// pinned note, and make it current.
    pub fn create_note(&mut self) -> NoteId {
        let note = Note::untitled();
        let id = note.id;
        self.insert_after_pinned(note);
        self.current_note_id = Some(id);
        info!(note_id = %id, "Note created");
        self.persist();
        id
    }

    /// Duplicate the current note (content and pinned flag), title
    /// "`<derived title>` Copy", fresh id and timestamps. No-op when there
    /// is no current note.
    pub fn duplicate_current(&mut self) -> Option<NoteId> {
        let source = self.current_note()?.clone();
        let now = Utc::now();
        let note = Note {
            id: NoteId::new(),
            title: format!("{} Copy", source.content.derive_title()),
            content: source.content.clone(),
            created_at: now,
            updated_at: now,
            pinned: source.pinned,
        };
        let id = note.id;
        self.insert_after_pinned(note);
        self.current_note_id = Some(id);
        info!(note_id = %id, source_id = %source.id, "Note duplicated");
        self.persist();
        Some(id)
    }

    /// Replace a note's content, re-deriving its title from the first
    /// level-1 heading and refreshing `updated_at`. The only place titles
    /// are ever assigned. Silent no-op for unknown ids.
    pub fn update_content(&mut self, id: NoteId, content: Document) {
        let Some(note) = self.notes.iter_mut().find(|n| n.id == id) else {
            debug!(note_id = %id, "update_content for unknown note, ignoring");
            return;
        };
        note.title = content.derive_title();
        note.content = content;
        note.updated_at = Utc::now();
        self.persist();
    }

    /// Delete a note. Deleting the current note selects the new head of
    /// the presented order, or synthesizes a fresh note when none remain.
    /// Idempotent for unknown ids.
    pub fn delete_note(&mut self, id: NoteId) {
        let Some(index) = self.notes.iter().position(|n| n.id == id) else {
            debug!(note_id = %id, "delete for unknown note, ignoring");
            // A stale current reference must still never dangle
            self.repair_current();
            return;
        };
        self.notes.remove(index);
        info!(note_id = %id, remaining = self.notes.len(), "Note deleted");

        if self.notes.is_empty() {
            // create_note persists
            self.create_note();
            return;
        }

        self.repair_current();
        self.persist();
    }

    /// Flip a note's pinned flag and immediately re-apply the canonical
    /// order - the one mutation that reorders synchronously.
    pub fn toggle_pin(&mut self, id: NoteId) {
        let Some(note) = self.notes.iter_mut().find(|n| n.id == id) else {
            debug!(note_id = %id, "toggle_pin for unknown note, ignoring");
            return;
        };
        note.pinned = !note.pinned;
        debug!(note_id = %id, pinned = note.pinned, "Pin toggled");
        canonical_sort(&mut self.notes);
        self.persist();
    }

    /// Make an existing note current. No-op for unknown ids.
    pub fn select_note(&mut self, id: NoteId) -> bool {
        if self.get(id).is_some() {
            self.current_note_id = Some(id);
            true
        } else {
            debug!(note_id = %id, "select for unknown note, ignoring");
            false
        }
    }

    /// Serialize the full set, canonically sorted, to the snapshot blob.
    /// Failures are logged and swallowed; the in-memory store stays
    /// authoritative for the session.
    pub fn persist(&self) {
        let mut sorted = self.notes.clone();
        canonical_sort(&mut sorted);
        snapshot::write(&self.snapshot_path, &sorted).log_err();
    }

    // ---- Internals ----

    /// Splice a new note in at `index(last pinned) + 1`: never above the
    /// pinned block, never auto-pinned, and without a full resort that
    /// would jump the user's view.
    fn insert_after_pinned(&mut self, note: Note) {
        let insert_at = self
            .notes
            .iter()
            .rposition(|n| n.pinned)
            .map(|i| i + 1)
            .unwrap_or(0);
        self.notes.insert(insert_at, note);
    }

    /// Re-point `current_note_id` at the head if it no longer resolves.
    fn repair_current(&mut self) {
        let resolves = self
            .current_note_id
            .map(|id| self.get(id).is_some())
            .unwrap_or(false);
        if !resolves {
            self.current_note_id = self.notes.first().map(|n| n.id);
        }
    }
}
