//! In-document search
//!
//! Locates every case-insensitive occurrence of a literal term within a
//! document's text content, marks them, tracks a 1-based current match,
//! and navigates cyclically with the viewport following the current match.
//!
//! The engine is polymorphic over [`TextSpans`] - the capability set a
//! rendering surface must expose (enumerate spans, wrap sub-ranges in
//! markers, clear markers) - so the algorithm is testable without a real
//! rendering surface. [`EditorSurface`] is the concrete adapter over the
//! crate's document model.

mod engine;
mod matcher;
mod surface;

pub use engine::{SearchEngine, SearchResults, TextSpans};
pub use matcher::find_matches;
pub use surface::EditorSurface;
