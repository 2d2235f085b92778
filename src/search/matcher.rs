//! Literal substring matching within a single text span.

use std::ops::Range;

use regex::RegexBuilder;

/// All non-overlapping, case-insensitive matches of the literal `term`
/// inside `text`, as ascending byte ranges.
///
/// The term is escaped before compilation, so regex metacharacters
/// (`. * + ? ^ $ { } ( ) | [ ] \` and friends) match themselves.
pub fn find_matches(text: &str, term: &str) -> Vec<Range<usize>> {
    if term.is_empty() {
        return Vec::new();
    }

    // An escaped pattern always compiles; treat a failure as no matches
    // rather than surfacing an error from a find widget.
    let Ok(re) = RegexBuilder::new(&regex::escape(term))
        .case_insensitive(true)
        .build()
    else {
        return Vec::new();
    };

    re.find_iter(text).map(|m| m.range()).collect()
}
