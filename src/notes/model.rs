//! Note data model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::document::Document;

/// Unique identifier for a note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NoteId(pub Uuid);

impl NoteId {
    /// Create a new random NoteId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a NoteId from a UUID string
    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }

    /// Get the UUID as a string
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for NoteId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NoteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single note.
///
/// `title` is always derived from `content` (first level-1 heading, else
/// "Untitled") - it is never independently authored. Timestamps carry
/// millisecond precision in the snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Unique identifier, stable for the note's lifetime
    pub id: NoteId,

    /// Derived display title
    pub title: String,

    /// The note body
    pub content: Document,

    /// When the note was created (immutable)
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,

    /// When the content last changed
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,

    /// Pinned notes sort above everything else
    #[serde(default)]
    pub pinned: bool,
}

impl Note {
    /// Create a fresh untitled note.
    pub fn untitled() -> Self {
        let now = Utc::now();
        Note {
            id: NoteId::new(),
            title: "Untitled".to_string(),
            content: Document::untitled(),
            created_at: now,
            updated_at: now,
            pinned: false,
        }
    }

    /// Deeplink for opening this note from outside the app.
    pub fn deeplink(&self) -> String {
        format!("quicknotes://notes/{}", self.id)
    }

    /// Relative "time ago" label for the browse list.
    pub fn time_ago(&self, now: DateTime<Utc>) -> String {
        let diff = now.signed_duration_since(self.updated_at);
        let minutes = diff.num_minutes();
        let hours = diff.num_hours();
        let days = diff.num_days();

        if minutes < 1 {
            "just now".to_string()
        } else if minutes == 1 {
            "1 minute ago".to_string()
        } else if minutes < 60 {
            format!("{} minutes ago", minutes)
        } else if hours == 1 {
            "1 hour ago".to_string()
        } else if hours < 24 {
            format!("{} hours ago", hours)
        } else if days == 1 {
            "1 day ago".to_string()
        } else {
            format!("{} days ago", days)
        }
    }
}
