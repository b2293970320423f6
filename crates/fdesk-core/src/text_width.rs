#![forbid(unsafe_code)]

//! Display-width and grapheme helpers.
//!
//! Labels such as party names arrive from the backend in arbitrary scripts, so
//! every width computation goes through grapheme clusters rather than bytes.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Terminal cell width of a single grapheme cluster (0, 1, or 2).
#[inline]
pub fn grapheme_width(grapheme: &str) -> usize {
    if grapheme.chars().all(char::is_control) {
        return 0;
    }
    UnicodeWidthStr::width(grapheme).min(2)
}

/// Total cell width of `text`.
pub fn display_width(text: &str) -> usize {
    text.graphemes(true).map(grapheme_width).sum()
}

/// Longest prefix of `text` that fits in `max_width` cells.
///
/// Never splits a grapheme cluster.
pub fn truncate_to_width(text: &str, max_width: usize) -> &str {
    let mut used = 0usize;
    for (idx, grapheme) in text.grapheme_indices(true) {
        let w = grapheme_width(grapheme);
        if used + w > max_width {
            return &text[..idx];
        }
        used += w;
    }
    text
}

/// Remove the last grapheme cluster, returning whether anything was removed.
pub fn pop_grapheme(text: &mut String) -> bool {
    match text.grapheme_indices(true).next_back() {
        Some((idx, _)) => {
            text.truncate(idx);
            true
        }
        None => false,
    }
}
