//! Typed document nodes and the traversals the rest of the crate relies on.

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

use super::markup;

/// Heading depth. Only the first three levels exist in the document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

impl HeadingLevel {
    pub fn as_u8(self) -> u8 {
        match self {
            HeadingLevel::H1 => 1,
            HeadingLevel::H2 => 2,
            HeadingLevel::H3 => 3,
        }
    }

    pub fn from_u8(level: u8) -> Option<Self> {
        match level {
            1 => Some(HeadingLevel::H1),
            2 => Some(HeadingLevel::H2),
            3 => Some(HeadingLevel::H3),
            _ => None,
        }
    }
}

/// One item of a bullet or ordered list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListItem {
    /// Text runs in document order
    pub runs: Vec<String>,
}

impl ListItem {
    pub fn new(text: impl Into<String>) -> Self {
        ListItem {
            runs: vec![text.into()],
        }
    }

    pub fn text(&self) -> String {
        self.runs.concat()
    }
}

/// A block-level document node.
///
/// Inline content is a sequence of text runs; a run is the unit the search
/// engine addresses, mirroring how a rendered document splits text around
/// inline elements.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading {
        level: HeadingLevel,
        runs: Vec<String>,
    },
    Paragraph {
        runs: Vec<String>,
    },
    BulletList {
        items: Vec<ListItem>,
    },
    OrderedList {
        items: Vec<ListItem>,
    },
}

impl Block {
    pub fn heading(level: HeadingLevel, text: impl Into<String>) -> Self {
        Block::Heading {
            level,
            runs: vec![text.into()],
        }
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Block::Paragraph {
            runs: vec![text.into()],
        }
    }

    /// Joined text of this block's runs.
    pub fn text(&self) -> String {
        match self {
            Block::Heading { runs, .. } | Block::Paragraph { runs } => runs.concat(),
            Block::BulletList { items } | Block::OrderedList { items } => items
                .iter()
                .map(ListItem::text)
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// A note's body: an ordered sequence of blocks.
///
/// Always valid for rendering; an "empty" note still carries the minimal
/// shell produced by [`Document::untitled`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn new(blocks: Vec<Block>) -> Self {
        Document { blocks }
    }

    /// The minimal document shell a fresh note starts with.
    pub fn untitled() -> Self {
        Document {
            blocks: vec![Block::heading(HeadingLevel::H1, "Untitled")],
        }
    }

    /// Parse the HTML-subset markup form. Never fails; unrecognized
    /// structure degrades to plain paragraphs.
    pub fn parse(markup_text: &str) -> Self {
        markup::parse(markup_text)
    }

    /// Serialize to the HTML-subset markup form used by the snapshot.
    pub fn to_markup(&self) -> String {
        markup::to_markup(self)
    }

    /// Text of the first level-1 heading, if any. Drives title derivation.
    pub fn first_h1_text(&self) -> Option<String> {
        self.blocks.iter().find_map(|block| match block {
            Block::Heading {
                level: HeadingLevel::H1,
                runs,
            } => Some(runs.concat()),
            _ => None,
        })
    }

    /// The title a note with this content carries: the first level-1
    /// heading's text, or the literal "Untitled".
    pub fn derive_title(&self) -> String {
        self.first_h1_text()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| "Untitled".to_string())
    }

    /// All text runs in document order. These are the text-bearing leaves
    /// the search engine walks.
    pub fn text_runs(&self) -> Vec<&str> {
        let mut runs = Vec::new();
        for block in &self.blocks {
            match block {
                Block::Heading { runs: r, .. } | Block::Paragraph { runs: r } => {
                    runs.extend(r.iter().map(String::as_str));
                }
                Block::BulletList { items } | Block::OrderedList { items } => {
                    for item in items {
                        runs.extend(item.runs.iter().map(String::as_str));
                    }
                }
            }
        }
        runs
    }

    /// Full text content, blocks separated by newlines.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(Block::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Character count over text runs only (markup never counts).
    pub fn char_count(&self) -> usize {
        self.text_runs().iter().map(|r| r.chars().count()).sum()
    }

    /// Whitespace-separated word count over the text content.
    pub fn word_count(&self) -> usize {
        self.plain_text().split_whitespace().count()
    }

    /// Markdown rendering, for export.
    pub fn to_markdown(&self) -> String {
        let mut out = Vec::new();
        for block in &self.blocks {
            match block {
                Block::Heading { level, runs } => {
                    out.push(format!(
                        "{} {}",
                        "#".repeat(level.as_u8() as usize),
                        runs.concat()
                    ));
                }
                Block::Paragraph { runs } => out.push(runs.concat()),
                Block::BulletList { items } => {
                    out.push(
                        items
                            .iter()
                            .map(|item| format!("- {}", item.text()))
                            .collect::<Vec<_>>()
                            .join("\n"),
                    );
                }
                Block::OrderedList { items } => {
                    out.push(
                        items
                            .iter()
                            .enumerate()
                            .map(|(i, item)| format!("{}. {}", i + 1, item.text()))
                            .collect::<Vec<_>>()
                            .join("\n"),
                    );
                }
            }
        }
        out.join("\n\n")
    }
}

// The snapshot stores content as a markup string, so Document serializes
// through its markup form rather than as structured JSON.
impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_markup())
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MarkupVisitor;

        impl Visitor<'_> for MarkupVisitor {
            type Value = Document;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a markup string")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Document, E> {
                Ok(Document::parse(v))
            }
        }

        deserializer.deserialize_str(MarkupVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untitled_shell() {
        let doc = Document::untitled();
        assert_eq!(doc.derive_title(), "Untitled");
        assert_eq!(doc.to_markup(), "<h1>Untitled</h1>");
    }

    #[test]
    fn test_title_from_first_h1() {
        let doc = Document::parse("<h1>Hello</h1><p>World</p>");
        assert_eq!(doc.derive_title(), "Hello");
    }

    #[test]
    fn test_title_without_h1_is_untitled() {
        let doc = Document::parse("<h2>Sub</h2><p>Body</p>");
        assert_eq!(doc.derive_title(), "Untitled");
    }

    #[test]
    fn test_title_skips_later_h1s() {
        let doc = Document::new(vec![
            Block::heading(HeadingLevel::H1, "First"),
            Block::heading(HeadingLevel::H1, "Second"),
        ]);
        assert_eq!(doc.derive_title(), "First");
    }

    #[test]
    fn test_blank_h1_falls_back_to_untitled() {
        let doc = Document::new(vec![Block::heading(HeadingLevel::H1, "   ")]);
        assert_eq!(doc.derive_title(), "Untitled");
    }

    #[test]
    fn test_text_runs_in_document_order() {
        let doc = Document::new(vec![
            Block::heading(HeadingLevel::H1, "Title"),
            Block::Paragraph {
                runs: vec!["a ".into(), "b".into(), " c".into()],
            },
            Block::BulletList {
                items: vec![ListItem::new("one"), ListItem::new("two")],
            },
        ]);
        assert_eq!(doc.text_runs(), vec!["Title", "a ", "b", " c", "one", "two"]);
    }

    #[test]
    fn test_counts() {
        let doc = Document::parse("<h1>Hi</h1><p>two words</p>");
        assert_eq!(doc.char_count(), 11); // "Hi" + "two words"
        assert_eq!(doc.word_count(), 3);
    }

    #[test]
    fn test_markdown_export() {
        let doc = Document::parse(
            "<h1>Title</h1><p>Body</p><ul><li>a</li><li>b</li></ul><ol><li>one</li></ol>",
        );
        assert_eq!(
            doc.to_markdown(),
            "# Title\n\nBody\n\n- a\n- b\n\n1. one"
        );
    }

    #[test]
    fn test_serde_round_trips_as_markup_string() {
        let doc = Document::parse("<h1>Hello</h1><p>World</p>");
        let json = serde_json::to_string(&doc).unwrap();
        assert_eq!(json, "\"<h1>Hello</h1><p>World</p>\"");

        let back: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
    }
}
