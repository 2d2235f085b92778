//! Editor mirror
//!
//! The store's `update_content` is the single source of truth; the editor
//! view holds a transient, debounced copy of the current note. Edits
//! replace the mirror and arm a deadline; once input settles the pending
//! content reconciles into the store in one update. Deadlines are plain
//! data against an injected clock - no timer threads.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::document::Document;
use crate::notes::{NoteId, NoteStore};

/// Transient, debounced mirror of the current note's content.
pub struct EditorBuffer {
    note_id: Option<NoteId>,
    content: Document,
    debounce: Duration,
    deadline: Option<DateTime<Utc>>,
}

impl EditorBuffer {
    pub fn new(debounce_ms: u64) -> Self {
        EditorBuffer {
            note_id: None,
            content: Document::default(),
            debounce: Duration::milliseconds(debounce_ms as i64),
            deadline: None,
        }
    }

    /// The note the mirror currently reflects.
    pub fn note_id(&self) -> Option<NoteId> {
        self.note_id
    }

    /// The mirrored content.
    pub fn content(&self) -> &Document {
        &self.content
    }

    /// Whether an edit is waiting to reconcile.
    pub fn is_dirty(&self) -> bool {
        self.deadline.is_some()
    }

    /// Open a note in the editor, making it current in the store. Any
    /// pending edit to the previous note is flushed first so switching
    /// never loses input.
    pub fn open(&mut self, store: &mut NoteStore, id: NoteId) -> bool {
        self.flush_now(store);

        if !store.select_note(id) {
            return false;
        }
        // select_note succeeded, so the note exists
        let Some(note) = store.get(id) else {
            return false;
        };
        self.note_id = Some(id);
        self.content = note.content.clone();
        self.deadline = None;
        debug!(note_id = %id, "Editor opened note");
        true
    }

    /// Open whatever note the store considers current.
    pub fn open_current(&mut self, store: &mut NoteStore) -> bool {
        match store.current_note_id() {
            Some(id) => self.open(store, id),
            None => false,
        }
    }

    /// Replace the mirror with edited content and arm the debounce
    /// deadline. Content identical to the mirror is ignored.
    pub fn set_content(&mut self, content: Document, now: DateTime<Utc>) {
        if self.note_id.is_none() || content == self.content {
            return;
        }
        self.content = content;
        self.deadline = Some(now + self.debounce);
    }

    /// Reconcile the pending edit into the store if the debounce deadline
    /// has passed. Returns true when an update was applied.
    pub fn flush_due(&mut self, store: &mut NoteStore, now: DateTime<Utc>) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.apply(store);
                true
            }
            _ => false,
        }
    }

    /// Reconcile immediately, ignoring the deadline. Used when switching
    /// notes or shutting down.
    pub fn flush_now(&mut self, store: &mut NoteStore) -> bool {
        if self.deadline.is_some() {
            self.apply(store);
            true
        } else {
            false
        }
    }

    fn apply(&mut self, store: &mut NoteStore) {
        if let Some(id) = self.note_id {
            store.update_content(id, self.content.clone());
        }
        self.deadline = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (tempfile::TempDir, NoteStore, EditorBuffer) {
        let dir = tempfile::tempdir().unwrap();
        let store = NoteStore::load(dir.path().join("notes.json"));
        let editor = EditorBuffer::new(300);
        (dir, store, editor)
    }

    #[test]
    fn test_open_current_mirrors_content() {
        let (_dir, mut store, mut editor) = setup();
        assert!(editor.open_current(&mut store));
        assert_eq!(editor.note_id(), store.current_note_id());
        assert_eq!(editor.content(), &store.current_note().unwrap().content);
        assert!(!editor.is_dirty());
    }

    #[test]
    fn test_edits_coalesce_into_one_update() {
        let (_dir, mut store, mut editor) = setup();
        editor.open_current(&mut store);
        let id = editor.note_id().unwrap();
        let t0 = Utc::now();

        editor.set_content(Document::parse("<h1>a</h1>"), t0);
        editor.set_content(
            Document::parse("<h1>ab</h1>"),
            t0 + Duration::milliseconds(100),
        );
        editor.set_content(
            Document::parse("<h1>abc</h1>"),
            t0 + Duration::milliseconds(200),
        );

        // Deadline armed from the last edit; nothing reconciles before it
        assert!(!editor.flush_due(&mut store, t0 + Duration::milliseconds(450)));
        assert_eq!(store.get(id).unwrap().title, "Untitled");

        assert!(editor.flush_due(&mut store, t0 + Duration::milliseconds(500)));
        assert_eq!(store.get(id).unwrap().title, "abc");
        assert!(!editor.is_dirty());
    }

    #[test]
    fn test_unchanged_content_does_not_arm_deadline() {
        let (_dir, mut store, mut editor) = setup();
        editor.open_current(&mut store);

        let same = editor.content().clone();
        editor.set_content(same, Utc::now());
        assert!(!editor.is_dirty());
    }

    #[test]
    fn test_switching_notes_flushes_pending_edit() {
        let (_dir, mut store, mut editor) = setup();
        editor.open_current(&mut store);
        let first = editor.note_id().unwrap();

        editor.set_content(Document::parse("<h1>Pending</h1>"), Utc::now());
        assert!(editor.is_dirty());

        let second = store.create_note();
        editor.open(&mut store, second);

        assert_eq!(store.get(first).unwrap().title, "Pending");
        assert_eq!(editor.note_id(), Some(second));
        assert!(!editor.is_dirty());
    }

    #[test]
    fn test_open_unknown_note_is_refused() {
        let (_dir, mut store, mut editor) = setup();
        editor.open_current(&mut store);
        let before = editor.note_id();

        assert!(!editor.open(&mut store, NoteId::new()));
        assert_eq!(editor.note_id(), before);
    }

    #[test]
    fn test_flush_now_ignores_deadline() {
        let (_dir, mut store, mut editor) = setup();
        editor.open_current(&mut store);
        let id = editor.note_id().unwrap();

        editor.set_content(Document::parse("<h1>Now</h1>"), Utc::now());
        assert!(editor.flush_now(&mut store));
        assert_eq!(store.get(id).unwrap().title, "Now");
        assert!(!editor.flush_now(&mut store), "nothing left to flush");
    }
}
