//! Command surface
//!
//! Every operation the shell can invoke, as one enum variant each, plus
//! the workspace that dispatches them. Keyboard shortcuts, palette rows,
//! and CLI subcommands all funnel through [`Command`], so the core's
//! behavior never depends on which surface asked.

use tracing::debug;

use crate::config::Config;
use crate::document::Document;
use crate::editor::EditorBuffer;
use crate::error::{NotesError, Result};
use crate::host::{self, PanelHost};
use crate::notes::{NoteId, NoteStore};
use crate::search::{EditorSurface, SearchEngine, SearchResults};

/// One shell-invokable operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    NewNote,
    DuplicateNote,
    DeleteNote(NoteId),
    DeleteCurrentNote,
    TogglePin(NoteId),
    SelectNote(NoteId),
    SetSearchTerm(String),
    ClearSearch,
    NextMatch,
    PreviousMatch,
    HidePanel,
    QuitApp,
    ToggleScreenSharingVisibility,
}

/// Store, editor mirror, find session, and host, dispatched as one unit.
pub struct Workspace {
    store: NoteStore,
    editor: EditorBuffer,
    find: SearchEngine<EditorSurface>,
    host: Box<dyn PanelHost>,
}

impl Workspace {
    pub fn new(store: NoteStore, editor: EditorBuffer, host: Box<dyn PanelHost>) -> Self {
        let mut workspace = Workspace {
            store,
            editor,
            find: SearchEngine::detached(),
            host,
        };
        workspace.editor.open_current(&mut workspace.store);
        workspace
    }

    /// Load the store and editor according to `config`.
    pub fn from_config(config: &Config, host: Box<dyn PanelHost>) -> Self {
        let store = NoteStore::load(config.snapshot_path());
        let editor = EditorBuffer::new(config.autosave_debounce_ms);
        Self::new(store, editor, host)
    }

    pub fn store(&self) -> &NoteStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut NoteStore {
        &mut self.store
    }

    pub fn editor(&self) -> &EditorBuffer {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> (&mut EditorBuffer, &mut NoteStore) {
        (&mut self.editor, &mut self.store)
    }

    pub fn host(&self) -> &dyn PanelHost {
        self.host.as_ref()
    }

    /// Counters for the find widget.
    pub fn find_results(&self) -> SearchResults {
        self.find.results()
    }

    /// The live find surface, for rendering highlights.
    pub fn find_surface(&self) -> Option<&EditorSurface> {
        self.find.surface()
    }

    /// Apply one command. Store and search failures are silent no-ops by
    /// design; only host operations can error.
    pub fn apply(&mut self, command: Command) -> Result<()> {
        debug!(command = ?command, "Dispatching command");
        match command {
            Command::NewNote => {
                self.cancel_search();
                self.store.create_note();
                self.editor.open_current(&mut self.store);
            }
            Command::DuplicateNote => {
                self.cancel_search();
                // Duplicate what the user sees, including unsettled edits
                self.editor.flush_now(&mut self.store);
                self.store.duplicate_current();
                self.editor.open_current(&mut self.store);
            }
            Command::DeleteNote(id) => self.delete(id),
            Command::DeleteCurrentNote => {
                if let Some(id) = self.store.current_note_id() {
                    self.delete(id);
                }
            }
            Command::TogglePin(id) => self.store.toggle_pin(id),
            Command::SelectNote(id) => {
                self.cancel_search();
                self.editor.open(&mut self.store, id);
            }
            Command::SetSearchTerm(term) => {
                self.set_search_term(&term);
            }
            Command::ClearSearch => self.cancel_search(),
            Command::NextMatch => self.find.go_to_next(),
            Command::PreviousMatch => self.find.go_to_previous(),
            Command::HidePanel => self.host.hide_panel(),
            Command::QuitApp => self.host.quit(),
            Command::ToggleScreenSharingVisibility => {
                host::toggle_screen_sharing_visibility(self.host.as_ref())
                    .map_err(|e| NotesError::Host(e.to_string()))?;
            }
        }
        Ok(())
    }

    /// Start or refresh a find session over the current note. Pending
    /// edits flush first so the scan sees settled content. Returns the
    /// total match count.
    pub fn set_search_term(&mut self, term: &str) -> usize {
        self.editor.flush_now(&mut self.store);

        self.find = match self.store.current_note() {
            Some(note) => SearchEngine::new(EditorSurface::new(&note.content)),
            None => SearchEngine::detached(),
        };
        self.find.set_search_term(term)
    }

    /// Route an edited document into the mirror. `flush_due` (or a
    /// note switch) reconciles it into the store.
    pub fn edit_content(&mut self, content: Document) {
        self.editor.set_content(content, chrono::Utc::now());
    }

    fn delete(&mut self, id: NoteId) {
        self.cancel_search();
        // A pending edit to the doomed note flushes into a no-op
        self.store.delete_note(id);
        self.editor.open_current(&mut self.store);
    }

    /// Tear down the find session so no stale markers survive into the
    /// next note or the next search.
    fn cancel_search(&mut self) {
        self.find.clear_search();
        self.find = SearchEngine::detached();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HeadlessHost;

    fn workspace() -> (tempfile::TempDir, Workspace) {
        let dir = tempfile::tempdir().unwrap();
        let store = NoteStore::load(dir.path().join("notes.json"));
        let editor = EditorBuffer::new(0);
        let workspace = Workspace::new(store, editor, Box::new(HeadlessHost::new()));
        (dir, workspace)
    }

    #[test]
    fn test_new_note_command() {
        let (_dir, mut ws) = workspace();
        ws.apply(Command::NewNote).unwrap();
        assert_eq!(ws.store().len(), 2);
        assert_eq!(ws.editor().note_id(), ws.store().current_note_id());
    }

    #[test]
    fn test_duplicate_includes_pending_edit() {
        let (_dir, mut ws) = workspace();
        ws.edit_content(Document::parse("<h1>Draft</h1>"));
        ws.apply(Command::DuplicateNote).unwrap();

        let copy = ws.store().current_note().unwrap();
        assert_eq!(copy.title, "Draft Copy");
    }

    #[test]
    fn test_delete_current_note_command() {
        let (_dir, mut ws) = workspace();
        let only = ws.store().current_note_id().unwrap();
        ws.apply(Command::DeleteCurrentNote).unwrap();

        assert_eq!(ws.store().len(), 1);
        assert_ne!(ws.store().current_note_id(), Some(only));
        assert_eq!(ws.editor().note_id(), ws.store().current_note_id());
    }

    #[test]
    fn test_search_commands_round_trip() {
        let (_dir, mut ws) = workspace();
        ws.edit_content(Document::parse("<p>the cat sat on the mat</p>"));

        ws.apply(Command::SetSearchTerm("the".into())).unwrap();
        assert_eq!(ws.find_results().total, 2);
        assert_eq!(ws.find_results().current, 1);

        ws.apply(Command::NextMatch).unwrap();
        assert_eq!(ws.find_results().current, 2);
        ws.apply(Command::NextMatch).unwrap();
        assert_eq!(ws.find_results().current, 1);

        ws.apply(Command::ClearSearch).unwrap();
        assert_eq!(ws.find_results().total, 0);
    }

    #[test]
    fn test_switching_notes_tears_down_search() {
        let (_dir, mut ws) = workspace();
        ws.edit_content(Document::parse("<p>needle</p>"));
        ws.apply(Command::SetSearchTerm("needle".into())).unwrap();
        assert_eq!(ws.find_results().total, 1);

        ws.apply(Command::NewNote).unwrap();
        assert_eq!(ws.find_results().total, 0);
        assert!(ws.find_surface().is_none());
    }

    #[test]
    fn test_toggle_screen_sharing_command() {
        let (_dir, mut ws) = workspace();
        assert!(ws.host().screen_sharing_visible().unwrap());
        ws.apply(Command::ToggleScreenSharingVisibility).unwrap();
        assert!(!ws.host().screen_sharing_visible().unwrap());
    }

    #[test]
    fn test_pin_command_reorders() {
        let (_dir, mut ws) = workspace();
        ws.apply(Command::NewNote).unwrap();
        let oldest = ws.store().notes().last().unwrap().id;

        ws.apply(Command::TogglePin(oldest)).unwrap();
        assert_eq!(ws.store().notes()[0].id, oldest);
        assert!(ws.store().notes()[0].pinned);
    }
}
