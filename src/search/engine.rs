//! The search engine proper: scan, mark, count, navigate.

use std::ops::Range;

use tracing::debug;

use super::matcher::find_matches;

/// Capability set a rendering surface exposes to the search engine.
///
/// Spans are the text-bearing leaves of the rendered document, addressed
/// by their document-order index. Match indices are global, numbered from
/// 0 in document order.
pub trait TextSpans {
    /// Text of every span, in document order. Called before any mutation
    /// so the scan never walks a tree it is splicing markers into.
    fn span_texts(&self) -> Vec<String>;

    /// Wrap the given sub-ranges of one span in highlight markers. Ranges
    /// are ascending, non-overlapping byte ranges into the span's text;
    /// unmatched text around them must be preserved.
    fn wrap_matches(&mut self, span_index: usize, ranges: &[Range<usize>]);

    /// Mark or unmark the match at a global index as the current one.
    fn set_current(&mut self, match_index: usize, current: bool);

    /// Scroll the viewport so the match at a global index sits centered.
    fn reveal(&mut self, match_index: usize);

    /// Remove all markers, restoring the original text exactly (no empty
    /// wrapper artifacts, adjacent text merged back together).
    fn clear_markers(&mut self);
}

/// Match bookkeeping exposed to the find widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchResults {
    /// 1-based index of the current match; 0 when there are none
    pub current: usize,
    /// Total matches from the last scan
    pub total: usize,
}

/// In-document search over an optional surface.
///
/// Without a surface every operation is a no-op returning empty results -
/// the absence of a document to search in is not an error. A session is
/// entirely transient: `clear_search` tears it down.
pub struct SearchEngine<S: TextSpans> {
    surface: Option<S>,
    current: usize, // 1-based, 0 = none
    total: usize,
}

impl<S: TextSpans> SearchEngine<S> {
    pub fn new(surface: S) -> Self {
        SearchEngine {
            surface: Some(surface),
            current: 0,
            total: 0,
        }
    }

    /// An engine with no document to search; all operations no-op.
    pub fn detached() -> Self {
        SearchEngine {
            surface: None,
            current: 0,
            total: 0,
        }
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    /// Scan for `term`, replacing any previous session. Returns the total
    /// match count. A term that is empty after trimming clears and leaves
    /// zero matches.
    pub fn set_search_term(&mut self, term: &str) -> usize {
        self.clear_search();

        if term.trim().is_empty() {
            return 0;
        }
        let Some(surface) = self.surface.as_mut() else {
            return 0;
        };

        // Collect all leaves first; wrapping mutates the spans and must
        // never race the traversal.
        let texts = surface.span_texts();

        let mut total = 0;
        for (span_index, text) in texts.iter().enumerate() {
            let ranges = find_matches(text, term);
            if !ranges.is_empty() {
                total += ranges.len();
                surface.wrap_matches(span_index, &ranges);
            }
        }

        self.total = total;
        if total > 0 {
            self.current = 1;
            surface.set_current(0, true);
            surface.reveal(0);
        }

        debug!(term, total, "Search term applied");
        total
    }

    /// Current/total counters for the find widget.
    pub fn results(&self) -> SearchResults {
        SearchResults {
            current: self.current,
            total: self.total,
        }
    }

    /// Advance the current match, wrapping from the last back to the
    /// first. No-op with zero matches.
    pub fn go_to_next(&mut self) {
        if self.total == 0 {
            return;
        }
        let next = if self.current >= self.total {
            1
        } else {
            self.current + 1
        };
        self.move_current(next);
    }

    /// Step the current match back, wrapping from the first to the last.
    /// No-op with zero matches.
    pub fn go_to_previous(&mut self) {
        if self.total == 0 {
            return;
        }
        let prev = if self.current <= 1 {
            self.total
        } else {
            self.current - 1
        };
        self.move_current(prev);
    }

    /// Tear down the session: remove all markers and reset counts. Safe
    /// to call with no prior matches.
    pub fn clear_search(&mut self) {
        if let Some(surface) = self.surface.as_mut() {
            surface.clear_markers();
        }
        self.current = 0;
        self.total = 0;
    }

    fn move_current(&mut self, to: usize) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        if self.current > 0 {
            surface.set_current(self.current - 1, false);
        }
        self.current = to;
        surface.set_current(to - 1, true);
        surface.reveal(to - 1);
    }
}
