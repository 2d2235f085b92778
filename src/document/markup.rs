//! Markup form of the document model.
//!
//! The snapshot stores note bodies as a flat HTML subset: `h1`-`h3`, `p`,
//! `ul`, `ol`, `li`, with plain text content. Parsing is a single forward
//! scan that never fails: unknown tags are dropped (their text keeps
//! flowing into the enclosing block, splitting it into separate runs) and
//! loose text becomes a paragraph.

use super::model::{Block, Document, HeadingLevel, ListItem};

/// Serialize a document to its markup string.
pub(super) fn to_markup(doc: &Document) -> String {
    let mut out = String::new();
    for block in &doc.blocks {
        match block {
            Block::Heading { level, runs } => {
                let n = level.as_u8();
                out.push_str(&format!("<h{}>{}</h{}>", n, escape(&runs.concat()), n));
            }
            Block::Paragraph { runs } => {
                out.push_str(&format!("<p>{}</p>", escape(&runs.concat())));
            }
            Block::BulletList { items } => {
                out.push_str("<ul>");
                for item in items {
                    out.push_str(&format!("<li>{}</li>", escape(&item.text())));
                }
                out.push_str("</ul>");
            }
            Block::OrderedList { items } => {
                out.push_str("<ol>");
                for item in items {
                    out.push_str(&format!("<li>{}</li>", escape(&item.text())));
                }
                out.push_str("</ol>");
            }
        }
    }
    out
}

/// Parse markup into a document. Infallible by design.
pub(super) fn parse(input: &str) -> Document {
    let mut parser = Parser {
        blocks: Vec::new(),
        container: Container::Loose { runs: Vec::new() },
    };

    let mut rest = input;
    while let Some(lt) = rest.find('<') {
        let (text, tail) = rest.split_at(lt);
        parser.text(text);

        match tail[1..].find('>') {
            Some(gt) => {
                parser.tag(&tail[1..gt + 1]);
                rest = &tail[gt + 2..];
            }
            None => {
                // Unterminated tag: treat the remainder as text
                parser.text(&tail[1..]);
                rest = "";
            }
        }
    }
    parser.text(rest);

    parser.flush();
    Document::new(parser.blocks)
}

enum Container {
    /// Text outside any block element; flushed as a paragraph
    Loose { runs: Vec<String> },
    Heading {
        level: HeadingLevel,
        runs: Vec<String>,
    },
    Paragraph { runs: Vec<String> },
    List {
        ordered: bool,
        items: Vec<ListItem>,
        current: Option<Vec<String>>,
    },
}

struct Parser {
    blocks: Vec<Block>,
    container: Container,
}

impl Parser {
    fn text(&mut self, raw: &str) {
        if raw.is_empty() {
            return;
        }
        let decoded = decode(raw);
        match &mut self.container {
            Container::Loose { runs } => {
                if !decoded.trim().is_empty() {
                    runs.push(decoded);
                }
            }
            Container::Heading { runs, .. } | Container::Paragraph { runs } => {
                runs.push(decoded);
            }
            Container::List { current, items, .. } => match current {
                Some(runs) => runs.push(decoded),
                // Stray text between items degrades to its own item
                None if !decoded.trim().is_empty() => {
                    items.push(ListItem { runs: vec![decoded] })
                }
                None => {}
            },
        }
    }

    fn tag(&mut self, content: &str) {
        let content = content.trim();
        let (closing, name_part) = match content.strip_prefix('/') {
            Some(rest) => (true, rest),
            None => (false, content),
        };
        // Tag name ends at the first non-alphanumeric char; attributes are dropped
        let name: String = name_part
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        if closing {
            self.close_tag(&name);
        } else {
            self.open_tag(&name);
        }
    }

    fn open_tag(&mut self, name: &str) {
        match name {
            "h1" | "h2" | "h3" => {
                self.flush();
                let level = HeadingLevel::from_u8(name[1..].parse().unwrap_or(1))
                    .unwrap_or(HeadingLevel::H1);
                self.container = Container::Heading {
                    level,
                    runs: Vec::new(),
                };
            }
            "p" => {
                self.flush();
                self.container = Container::Paragraph { runs: Vec::new() };
            }
            "ul" | "ol" => {
                self.flush();
                self.container = Container::List {
                    ordered: name == "ol",
                    items: Vec::new(),
                    current: None,
                };
            }
            "li" => {
                if let Container::List { items, current, .. } = &mut self.container {
                    if let Some(runs) = current.take() {
                        items.push(ListItem { runs });
                    }
                    *current = Some(Vec::new());
                } else {
                    // li outside a list degrades to a paragraph
                    self.flush();
                    self.container = Container::Paragraph { runs: Vec::new() };
                }
            }
            // Inline and unknown tags are dropped; their text still flows
            _ => {}
        }
    }

    fn close_tag(&mut self, name: &str) {
        match name {
            "h1" | "h2" | "h3" => {
                if matches!(self.container, Container::Heading { .. }) {
                    self.flush();
                }
            }
            "p" => {
                if matches!(self.container, Container::Paragraph { .. }) {
                    self.flush();
                }
            }
            "ul" | "ol" => {
                if matches!(self.container, Container::List { .. }) {
                    self.flush();
                }
            }
            "li" => {
                if let Container::List { items, current, .. } = &mut self.container {
                    if let Some(runs) = current.take() {
                        items.push(ListItem { runs });
                    }
                }
            }
            // Mismatched and unknown closers are ignored
            _ => {}
        }
    }

    fn flush(&mut self) {
        let container = std::mem::replace(
            &mut self.container,
            Container::Loose { runs: Vec::new() },
        );
        match container {
            Container::Loose { runs } => {
                if !runs.is_empty() {
                    self.blocks.push(Block::Paragraph { runs });
                }
            }
            Container::Heading { level, runs } => {
                self.blocks.push(Block::Heading { level, runs });
            }
            Container::Paragraph { runs } => {
                self.blocks.push(Block::Paragraph { runs });
            }
            Container::List {
                ordered,
                mut items,
                current,
            } => {
                if let Some(runs) = current {
                    items.push(ListItem { runs });
                }
                let block = if ordered {
                    Block::OrderedList { items }
                } else {
                    Block::BulletList { items }
                };
                self.blocks.push(block);
            }
        }
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn decode(text: &str) -> String {
    // &amp; decodes last so entity-encoded entities stay literal
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_note() {
        let doc = parse("<h1>Hello</h1><p>World</p>");
        assert_eq!(
            doc.blocks,
            vec![
                Block::heading(HeadingLevel::H1, "Hello"),
                Block::paragraph("World"),
            ]
        );
    }

    #[test]
    fn test_parse_lists() {
        let doc = parse("<ul><li>one</li><li>two</li></ul><ol><li>first</li></ol>");
        assert_eq!(
            doc.blocks,
            vec![
                Block::BulletList {
                    items: vec![ListItem::new("one"), ListItem::new("two")],
                },
                Block::OrderedList {
                    items: vec![ListItem::new("first")],
                },
            ]
        );
    }

    #[test]
    fn test_inline_tags_split_runs() {
        let doc = parse("<p>a <b>b</b> c</p>");
        assert_eq!(
            doc.blocks,
            vec![Block::Paragraph {
                runs: vec!["a ".into(), "b".into(), " c".into()],
            }]
        );
    }

    #[test]
    fn test_bare_text_becomes_paragraph() {
        let doc = parse("just some text");
        assert_eq!(doc.blocks, vec![Block::paragraph("just some text")]);
    }

    #[test]
    fn test_whitespace_between_blocks_is_dropped() {
        let doc = parse("<h1>a</h1>\n  <p>b</p>");
        assert_eq!(doc.blocks.len(), 2);
    }

    #[test]
    fn test_unclosed_block_still_flushes() {
        let doc = parse("<h1>dangling");
        assert_eq!(doc.blocks, vec![Block::heading(HeadingLevel::H1, "dangling")]);
    }

    #[test]
    fn test_entities_round_trip() {
        let doc = parse("<p>a &amp; b &lt;tag&gt;</p>");
        assert_eq!(doc.blocks[0].text(), "a & b <tag>");
        assert_eq!(to_markup(&doc), "<p>a &amp; b &lt;tag&gt;</p>");
    }

    #[test]
    fn test_markup_is_stable_through_parse() {
        let markup = "<h1>Title</h1><p>Body text</p><ul><li>x</li><li>y</li></ul>";
        assert_eq!(to_markup(&parse(markup)), markup);
    }

    #[test]
    fn test_attributes_are_dropped() {
        let doc = parse(r#"<p class="lead">text</p>"#);
        assert_eq!(doc.blocks, vec![Block::paragraph("text")]);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse("").blocks, Vec::new());
    }
}
