//! Concrete search surface over the crate's document model.
//!
//! Renders a [`Document`] into addressable spans - one per text run, one
//! line per block - and implements the [`TextSpans`] capabilities by
//! splitting runs into plain/highlight segments. Clearing merges segments
//! back into a single run, so the text content is restored exactly.

use std::ops::Range;

use crate::document::{Block, Document};

use super::engine::TextSpans;

/// Default number of lines the viewport shows.
const DEFAULT_VIEWPORT_LINES: usize = 10;

/// A plain or highlighted slice of a span.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Segment {
    Text(String),
    Highlight { text: String, current: bool },
}

#[derive(Debug, Clone)]
struct Span {
    /// Line the span sits on, for viewport math
    line: usize,
    segments: Vec<Segment>,
}

impl Span {
    fn text(&self) -> String {
        self.segments
            .iter()
            .map(|seg| match seg {
                Segment::Text(t) => t.as_str(),
                Segment::Highlight { text, .. } => text.as_str(),
            })
            .collect()
    }
}

/// A line-window viewport that can center a target line.
#[derive(Debug, Clone, Copy)]
struct Viewport {
    top: usize,
    height: usize,
}

impl Viewport {
    fn center_on(&mut self, line: usize) {
        self.top = line.saturating_sub(self.height / 2);
    }

    fn contains(&self, line: usize) -> bool {
        line >= self.top && line < self.top + self.height
    }
}

/// The editor-facing search surface.
pub struct EditorSurface {
    spans: Vec<Span>,
    viewport: Viewport,
    line_count: usize,
}

impl EditorSurface {
    /// Build a surface from a document: one span per text run, one line
    /// per block.
    pub fn new(document: &Document) -> Self {
        Self::with_viewport(document, DEFAULT_VIEWPORT_LINES)
    }

    pub fn with_viewport(document: &Document, viewport_lines: usize) -> Self {
        let mut spans = Vec::new();
        let mut line = 0;
        for block in &document.blocks {
            match block {
                Block::Heading { runs, .. } | Block::Paragraph { runs } => {
                    for run in runs {
                        spans.push(Span {
                            line,
                            segments: vec![Segment::Text(run.clone())],
                        });
                    }
                    line += 1;
                }
                Block::BulletList { items } | Block::OrderedList { items } => {
                    for item in items {
                        for run in &item.runs {
                            spans.push(Span {
                                line,
                                segments: vec![Segment::Text(run.clone())],
                            });
                        }
                        line += 1;
                    }
                }
            }
        }

        EditorSurface {
            spans,
            viewport: Viewport {
                top: 0,
                height: viewport_lines.max(1),
            },
            line_count: line,
        }
    }

    /// Text content of the whole surface, one line per span, for
    /// comparing against the pre-search state.
    pub fn text(&self) -> String {
        self.spans
            .iter()
            .map(Span::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Number of highlight markers present.
    pub fn highlight_count(&self) -> usize {
        self.highlights().count()
    }

    /// Global index of the match marked current, if any.
    pub fn current_highlight(&self) -> Option<usize> {
        self.highlights()
            .position(|seg| matches!(seg, Segment::Highlight { current: true, .. }))
    }

    /// Highlighted texts in document order.
    pub fn highlighted_texts(&self) -> Vec<String> {
        self.highlights()
            .map(|seg| match seg {
                Segment::Highlight { text, .. } => text.clone(),
                Segment::Text(_) => unreachable!(),
            })
            .collect()
    }

    /// Line the viewport currently starts at.
    pub fn viewport_top(&self) -> usize {
        self.viewport.top
    }

    /// Whether the current match is inside the visible line window.
    pub fn current_match_visible(&self) -> bool {
        self.current_match_line()
            .map(|line| self.viewport.contains(line))
            .unwrap_or(false)
    }

    pub fn line_count(&self) -> usize {
        self.line_count
    }

    /// Render the text with visible markers for terminal display:
    /// highlights wrapped in `[...]`, the current match in `[[...]]`.
    pub fn render_marked(&self) -> String {
        let mut lines = Vec::new();
        let mut line = String::new();
        let mut last_line = None;
        for span in &self.spans {
            if last_line.is_some() && last_line != Some(span.line) {
                lines.push(std::mem::take(&mut line));
            }
            last_line = Some(span.line);
            for seg in &span.segments {
                match seg {
                    Segment::Text(text) => line.push_str(text),
                    Segment::Highlight { text, current: true } => {
                        line.push_str(&format!("[[{}]]", text));
                    }
                    Segment::Highlight {
                        text,
                        current: false,
                    } => {
                        line.push_str(&format!("[{}]", text));
                    }
                }
            }
        }
        if last_line.is_some() {
            lines.push(line);
        }
        lines.join("\n")
    }

    fn highlights(&self) -> impl Iterator<Item = &Segment> {
        self.spans
            .iter()
            .flat_map(|span| span.segments.iter())
            .filter(|seg| matches!(seg, Segment::Highlight { .. }))
    }

    fn current_match_line(&self) -> Option<usize> {
        for span in &self.spans {
            for seg in &span.segments {
                if matches!(seg, Segment::Highlight { current: true, .. }) {
                    return Some(span.line);
                }
            }
        }
        None
    }

    /// Locate the span holding the match at a global index.
    fn span_of_match(&self, match_index: usize) -> Option<usize> {
        let mut seen = 0;
        for (span_index, span) in self.spans.iter().enumerate() {
            for seg in &span.segments {
                if matches!(seg, Segment::Highlight { .. }) {
                    if seen == match_index {
                        return Some(span_index);
                    }
                    seen += 1;
                }
            }
        }
        None
    }

    fn with_match_mut(&mut self, match_index: usize, f: impl FnOnce(&mut bool)) {
        let mut seen = 0;
        for span in &mut self.spans {
            for seg in &mut span.segments {
                if let Segment::Highlight { current, .. } = seg {
                    if seen == match_index {
                        f(current);
                        return;
                    }
                    seen += 1;
                }
            }
        }
    }
}

impl TextSpans for EditorSurface {
    fn span_texts(&self) -> Vec<String> {
        self.spans.iter().map(Span::text).collect()
    }

    fn wrap_matches(&mut self, span_index: usize, ranges: &[Range<usize>]) {
        let Some(span) = self.spans.get_mut(span_index) else {
            return;
        };
        let text = span.text();

        let mut segments = Vec::new();
        let mut cursor = 0;
        for range in ranges {
            if range.start > cursor {
                segments.push(Segment::Text(text[cursor..range.start].to_string()));
            }
            segments.push(Segment::Highlight {
                text: text[range.clone()].to_string(),
                current: false,
            });
            cursor = range.end;
        }
        if cursor < text.len() {
            segments.push(Segment::Text(text[cursor..].to_string()));
        }

        span.segments = segments;
    }

    fn set_current(&mut self, match_index: usize, current: bool) {
        self.with_match_mut(match_index, |flag| *flag = current);
    }

    fn reveal(&mut self, match_index: usize) {
        if let Some(span_index) = self.span_of_match(match_index) {
            let line = self.spans[span_index].line;
            self.viewport.center_on(line);
        }
    }

    fn clear_markers(&mut self) {
        for span in &mut self.spans {
            if span.segments.len() == 1 && matches!(span.segments[0], Segment::Text(_)) {
                continue;
            }
            // Merge back into a single text node; no empty wrappers remain
            span.segments = vec![Segment::Text(span.text())];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SearchEngine;

    fn doc(markup: &str) -> Document {
        Document::parse(markup)
    }

    #[test]
    fn test_spans_follow_document_order() {
        let surface = EditorSurface::new(&doc(
            "<h1>Title</h1><p>a <b>b</b> c</p><ul><li>one</li><li>two</li></ul>",
        ));
        assert_eq!(
            surface.span_texts(),
            vec!["Title", "a ", "b", " c", "one", "two"]
        );
        // h1 line 0, paragraph line 1, list items lines 2 and 3
        assert_eq!(surface.line_count(), 4);
    }

    #[test]
    fn test_wrap_preserves_surrounding_text() {
        let mut surface = EditorSurface::new(&doc("<p>the cat sat on the mat</p>"));
        surface.wrap_matches(0, &[0..3, 15..18]);

        assert_eq!(surface.highlight_count(), 2);
        assert_eq!(surface.highlighted_texts(), vec!["the", "the"]);
        assert_eq!(surface.text(), "the cat sat on the mat");
    }

    #[test]
    fn test_clear_restores_exact_text() {
        let original = doc("<h1>The Title</h1><p>the cat sat on the mat</p>");
        let surface = EditorSurface::new(&original);
        let before = surface.text();

        let mut engine = SearchEngine::new(surface);
        engine.set_search_term("the");
        engine.go_to_next();
        engine.go_to_next();
        engine.clear_search();

        let s = engine.surface().unwrap();
        assert_eq!(s.text(), before);
        assert_eq!(s.highlight_count(), 0);
    }

    #[test]
    fn test_engine_against_real_surface() {
        let surface = EditorSurface::new(&doc("<p>the cat sat on the mat</p>"));
        let mut engine = SearchEngine::new(surface);

        assert_eq!(engine.set_search_term("the"), 2);
        let s = engine.surface().unwrap();
        assert_eq!(s.highlight_count(), 2);
        assert_eq!(s.current_highlight(), Some(0));

        engine.go_to_next();
        assert_eq!(engine.surface().unwrap().current_highlight(), Some(1));

        // wraps back around
        engine.go_to_next();
        assert_eq!(engine.surface().unwrap().current_highlight(), Some(0));
    }

    #[test]
    fn test_matches_spanning_multiple_runs_count_globally() {
        let surface =
            EditorSurface::new(&doc("<p>alpha <b>alpha</b></p><ul><li>alpha</li></ul>"));
        let mut engine = SearchEngine::new(surface);
        assert_eq!(engine.set_search_term("alpha"), 3);
        assert_eq!(engine.surface().unwrap().highlighted_texts().len(), 3);
    }

    #[test]
    fn test_reveal_centers_viewport_on_current_match() {
        // 30 paragraphs; the needle sits on line 20
        let mut markup = String::new();
        for i in 0..30 {
            if i == 20 {
                markup.push_str("<p>needle</p>");
            } else {
                markup.push_str(&format!("<p>filler {}</p>", i));
            }
        }
        let surface = EditorSurface::with_viewport(&doc(&markup), 10);
        let mut engine = SearchEngine::new(surface);

        assert_eq!(engine.set_search_term("needle"), 1);
        let s = engine.surface().unwrap();
        assert_eq!(s.viewport_top(), 15, "line 20 centered in a 10-line window");
        assert!(s.current_match_visible());
    }

    #[test]
    fn test_unicode_text_wraps_on_char_boundaries() {
        let surface = EditorSurface::new(&doc("<p>naïve café naïve</p>"));
        let mut engine = SearchEngine::new(surface);
        assert_eq!(engine.set_search_term("naïve"), 2);
        assert_eq!(
            engine.surface().unwrap().highlighted_texts(),
            vec!["naïve", "naïve"]
        );
        engine.clear_search();
        assert_eq!(engine.surface().unwrap().text(), "naïve café naïve");
    }
}
