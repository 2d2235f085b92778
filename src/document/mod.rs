//! Rich-text document model
//!
//! Notes store their body as a small closed set of typed nodes (headings,
//! paragraphs, lists, list items, text runs) instead of untyped markup.
//! Title extraction and search traversal walk this structure.
//!
//! The model round-trips through the HTML-subset markup the snapshot format
//! uses (`h1`-`h3`, `p`, `ul`, `ol`, `li`), so persisted content stays a
//! plain string.

mod markup;
mod model;

pub use model::{Block, Document, HeadingLevel, ListItem};
