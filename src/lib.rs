//! quicknotes - the core of an always-available quick notes panel.
//!
//! The note store owns the canonical collection, the pinned-first /
//! recently-updated ordering, and the single persisted snapshot. The
//! in-document search engine finds, marks, and navigates literal matches
//! over any surface exposing the `TextSpans` capabilities. The AI chat
//! session is a strictly-bounded side-feature. Window chrome and keyboard
//! dispatch stay outside the crate, behind the `PanelHost` seam and the
//! `Command` surface.

pub mod ai;
pub mod command;
pub mod config;
pub mod document;
pub mod editor;
pub mod error;
pub mod host;
pub mod logging;
pub mod notes;
pub mod search;

pub use command::{Command, Workspace};
pub use config::Config;
pub use document::{Block, Document, HeadingLevel};
pub use editor::EditorBuffer;
pub use error::{NotesError, Result, ResultExt};
pub use host::{HeadlessHost, PanelHost};
pub use notes::{Note, NoteId, NoteStore};
pub use search::{EditorSurface, SearchEngine, SearchResults, TextSpans};
