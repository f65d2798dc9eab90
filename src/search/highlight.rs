//! Highlight rendering and clearing
//!
//! Matched substrings are wrapped in marker spans carrying a search-hit
//! class; the hit that anchors an occurrence additionally carries a "first"
//! class used for navigation, and the navigated-to anchor carries a
//! "current" class. Clearing unwraps every marker and merges the text back
//! so the content matches what was there before the pass, byte for byte.

use std::collections::BTreeMap;

use quick_xml::escape::partial_escape;

use crate::document::{NodeId, VerseDocument};
use crate::error::DocumentResult;
use crate::search::{Occurrence, TextSegment};

/// Class carried by every highlight marker
pub const HIGHLIGHT_CLASS: &str = "search-hl";

/// Class carried by the marker that anchors an occurrence
pub const FIRST_CLASS: &str = "first";

/// Class carried by the currently navigated-to anchor
pub const CURRENT_CLASS: &str = "current";

const MARKER_CLOSE: &str = "</span>";

/// One substring to wrap, in original-content byte offsets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrapRange {
    pub start: usize,
    pub len: usize,
    /// Whether the marker anchors an occurrence
    pub first: bool,
}

fn marker_open(first: bool) -> String {
    if first {
        format!("<span class=\"{} {}\">", HIGHLIGHT_CLASS, FIRST_CLASS)
    } else {
        format!("<span class=\"{}\">", HIGHLIGHT_CLASS)
    }
}

/// Wrap ranges of an already-serialized markup string. Later replacements
/// are shifted by a running insertion-length delta so they still target the
/// original offsets; overlapping ranges are dropped, first one wins.
pub fn wrap_markup_ranges(markup_text: &str, ranges: &[WrapRange]) -> (String, usize) {
    let mut sorted: Vec<WrapRange> = ranges.to_vec();
    sorted.sort_by_key(|r| r.start);

    let mut out = markup_text.to_string();
    let mut delta = 0usize;
    let mut last_end = 0usize;
    let mut wrapped = 0usize;
    for r in sorted {
        let end = r.start + r.len;
        if r.len == 0 || r.start < last_end {
            continue;
        }
        let Some(matched) = markup_text.get(r.start..end) else {
            continue;
        };
        let replacement = format!("{}{}{}", marker_open(r.first), matched, MARKER_CLOSE);
        out.replace_range(r.start + delta..end + delta, &replacement);
        delta += replacement.len() - r.len;
        last_end = end;
        wrapped += 1;
    }
    (out, wrapped)
}

/// Wrap ranges of a plain text payload, producing a markup fragment. The
/// unmatched stretches are escaped so the fragment re-parses to the same
/// text content.
pub fn wrap_text_ranges(text: &str, ranges: &[WrapRange]) -> (String, usize) {
    let mut sorted: Vec<WrapRange> = ranges.to_vec();
    sorted.sort_by_key(|r| r.start);

    let mut out = String::with_capacity(text.len() + sorted.len() * 48);
    let mut cursor = 0usize;
    let mut wrapped = 0usize;
    for r in sorted {
        let end = r.start + r.len;
        if r.len == 0 || r.start < cursor {
            continue;
        }
        let Some(matched) = text.get(r.start..end) else {
            continue;
        };
        out.push_str(&partial_escape(&text[cursor..r.start]));
        out.push_str(&marker_open(r.first));
        out.push_str(&partial_escape(matched));
        out.push_str(MARKER_CLOSE);
        cursor = end;
        wrapped += 1;
    }
    out.push_str(&partial_escape(&text[cursor..]));
    (out, wrapped)
}

/// Collapse linebreak artifacts between adjacent wrapped fragments so a
/// later pass over the same content still matches across the seam
pub fn collapse_boundary_newlines(markup_text: &str) -> String {
    const OPEN_PREFIX: &str = "<span class=\"search-hl";
    let mut out = String::with_capacity(markup_text.len());
    let mut rest = markup_text;
    while let Some(pos) = rest.find(MARKER_CLOSE) {
        let after_close = pos + MARKER_CLOSE.len();
        out.push_str(&rest[..after_close]);
        let tail = &rest[after_close..];
        let trimmed = tail.trim_start_matches('\n');
        if trimmed.len() != tail.len() && trimmed.starts_with(OPEN_PREFIX) {
            rest = trimmed;
        } else {
            rest = tail;
        }
    }
    out.push_str(rest);
    out
}

/// Wrap occurrences into the segments that carry them and write the results
/// back into the document. Returns how many hits were wrapped.
pub fn apply_to_segments(
    doc: &mut VerseDocument,
    segments: &[TextSegment],
    occurrences: &[Occurrence],
) -> DocumentResult<usize> {
    let mut by_segment: BTreeMap<usize, Vec<WrapRange>> = BTreeMap::new();
    for occ in occurrences {
        by_segment.entry(occ.segment).or_default().push(WrapRange {
            start: occ.offset,
            len: occ.text.len(),
            first: occ.first_of_phrase,
        });
    }

    let mut applied = 0usize;
    for (index, ranges) in by_segment {
        let Some(segment) = segments.get(index) else {
            continue;
        };
        let (wrapped_markup, wrapped) = wrap_text_ranges(&segment.text, &ranges);
        if wrapped == 0 {
            continue;
        }
        let markup_out = collapse_boundary_newlines(&wrapped_markup);
        doc.replace_text_with_markup(segment.node, &markup_out)?;
        applied += wrapped;
    }
    Ok(applied)
}

/// Rewrap a whole verse from its wrapped markup string
pub fn apply_to_markup(
    doc: &mut VerseDocument,
    verse: NodeId,
    markup_text: &str,
    ranges: &[WrapRange],
) -> DocumentResult<usize> {
    let (wrapped_markup, wrapped) = wrap_markup_ranges(markup_text, ranges);
    if wrapped == 0 {
        return Ok(0);
    }
    let markup_out = collapse_boundary_newlines(&wrapped_markup);
    doc.set_inner_markup(verse, &markup_out)?;
    Ok(wrapped)
}

/// Wrap every text payload of an annotated element (key search hit). The
/// first non-empty payload carries the anchor class.
pub fn wrap_element_text(doc: &mut VerseDocument, element: NodeId) -> DocumentResult<usize> {
    let text_ids = doc.text_nodes_under(element);
    let mut first = true;
    let mut wrapped = 0usize;
    for id in text_ids {
        let payload = match doc.text(id) {
            Some(p) if !p.trim().is_empty() => p.to_string(),
            _ => continue,
        };
        let ranges = [WrapRange {
            start: 0,
            len: payload.len(),
            first,
        }];
        let (markup_out, n) = wrap_text_ranges(&payload, &ranges);
        if n == 0 {
            continue;
        }
        doc.replace_text_with_markup(id, &markup_out)?;
        first = false;
        wrapped += n;
    }
    Ok(wrapped)
}

/// Unwrap every highlight marker below `root`. Returns how many were removed.
pub fn clear_highlights(doc: &mut VerseDocument, root: NodeId) -> usize {
    let markers = doc.elements_with_class(root, HIGHLIGHT_CLASS);
    let mut removed = 0usize;
    for marker in markers {
        match doc.unwrap_element(marker) {
            Ok(()) => removed += 1,
            Err(e) => log::debug!("skipping stray highlight marker {}: {}", marker, e),
        }
    }
    removed
}

/// Anchor markers below `root` in document order
pub fn collect_anchors(doc: &VerseDocument, root: NodeId) -> Vec<NodeId> {
    doc.elements_with_class(root, HIGHLIGHT_CLASS)
        .into_iter()
        .filter(|id| {
            doc.element(*id)
                .map(|el| el.has_class(FIRST_CLASS))
                .unwrap_or(false)
        })
        .collect()
}

/// Mark an anchor as the navigated-to occurrence
pub fn set_current(doc: &mut VerseDocument, anchor: NodeId) {
    if let Some(el) = doc.element_mut(anchor) {
        el.add_class(CURRENT_CLASS);
    }
}

/// Remove the navigated-to emphasis from an anchor
pub fn clear_current(doc: &mut VerseDocument, anchor: NodeId) {
    if let Some(el) = doc.element_mut(anchor) {
        el.remove_class(CURRENT_CLASS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_text_single_range() {
        let ranges = [WrapRange {
            start: 6,
            len: 4,
            first: true,
        }];
        let (out, n) = wrap_text_ranges("Jesus wept.", &ranges);
        assert_eq!(out, "Jesus <span class=\"search-hl first\">wept</span>.");
        assert_eq!(n, 1);
    }

    #[test]
    fn test_wrap_text_close_repeats() {
        let ranges = [
            WrapRange {
                start: 0,
                len: 2,
                first: true,
            },
            WrapRange {
                start: 3,
                len: 2,
                first: false,
            },
        ];
        let (out, n) = wrap_text_ranges("aa aa", &ranges);
        assert_eq!(
            out,
            "<span class=\"search-hl first\">aa</span> <span class=\"search-hl\">aa</span>"
        );
        assert_eq!(n, 2);
    }

    #[test]
    fn test_wrap_text_escapes_content() {
        let ranges = [WrapRange {
            start: 6,
            len: 5,
            first: true,
        }];
        let (out, n) = wrap_text_ranges("day & night", &ranges);
        assert_eq!(out, "day &amp; <span class=\"search-hl first\">night</span>");
        assert_eq!(n, 1);
    }

    #[test]
    fn test_wrap_markup_running_delta() {
        let ranges = [
            WrapRange {
                start: 0,
                len: 3,
                first: true,
            },
            WrapRange {
                start: 10,
                len: 3,
                first: true,
            },
        ];
        let (out, n) = wrap_markup_ranges("the light the", &ranges);
        assert_eq!(
            out,
            "<span class=\"search-hl first\">the</span> light <span class=\"search-hl first\">the</span>"
        );
        assert_eq!(n, 2);
    }

    #[test]
    fn test_wrap_overlap_first_wins() {
        let ranges = [
            WrapRange {
                start: 0,
                len: 3,
                first: true,
            },
            WrapRange {
                start: 2,
                len: 2,
                first: false,
            },
        ];
        let (out, n) = wrap_markup_ranges("aaaa", &ranges);
        assert_eq!(out, "<span class=\"search-hl first\">aaa</span>a");
        assert_eq!(n, 1);
    }

    #[test]
    fn test_wrap_out_of_bounds_range_skipped() {
        let ranges = [WrapRange {
            start: 3,
            len: 10,
            first: true,
        }];
        let (out, n) = wrap_markup_ranges("abc", &ranges);
        assert_eq!(out, "abc");
        assert_eq!(n, 0);
    }

    #[test]
    fn test_collapse_boundary_newlines() {
        let broken = "<span class=\"search-hl\">a</span>\n<span class=\"search-hl\">b</span>";
        let fixed = collapse_boundary_newlines(broken);
        assert_eq!(
            fixed,
            "<span class=\"search-hl\">a</span><span class=\"search-hl\">b</span>"
        );
        // newlines not followed by a marker stay put
        let legit = "<span class=\"search-hl\">a</span>\nplain";
        assert_eq!(collapse_boundary_newlines(legit), legit);
    }

    #[test]
    fn test_apply_and_clear_round_trip() {
        let original = "<div class=\"verse-text\">Jesus wept. John 11:35</div>";
        let mut doc = VerseDocument::parse(original).unwrap();
        let verse = doc.verse_roots()[0];
        let segments = crate::search::segments::collect(&doc, verse);
        let occurrences = [Occurrence {
            segment: 0,
            offset: 6,
            text: "wept".to_string(),
            first_of_phrase: true,
        }];
        let applied = apply_to_segments(&mut doc, &segments, &occurrences).unwrap();
        assert_eq!(applied, 1);
        assert_eq!(
            doc.inner_markup(verse),
            "Jesus <span class=\"search-hl first\">wept</span>. John 11:35"
        );

        let root = doc.root();
        let removed = clear_highlights(&mut doc, root);
        assert_eq!(removed, 1);
        assert_eq!(doc.inner_markup(root), original);
        assert_eq!(doc.text_content(verse), "Jesus wept. John 11:35");

        // clearing again with nothing highlighted is a no-op
        assert_eq!(clear_highlights(&mut doc, root), 0);
        assert_eq!(doc.inner_markup(root), original);
    }

    #[test]
    fn test_collect_anchors_skips_plain_markers() {
        let doc = VerseDocument::parse(concat!(
            "<div class=\"verse-text\">",
            "<span class=\"search-hl first\">God</span> ",
            "<span class=\"search-hl\">created</span>",
            "</div>"
        ))
        .unwrap();
        let anchors = collect_anchors(&doc, doc.root());
        assert_eq!(anchors.len(), 1);
        assert_eq!(doc.text_content(anchors[0]), "God");
    }

    #[test]
    fn test_current_class_toggles() {
        let mut doc = VerseDocument::parse(
            "<div class=\"verse-text\"><span class=\"search-hl first\">God</span></div>",
        )
        .unwrap();
        let anchor = collect_anchors(&doc, doc.root())[0];
        set_current(&mut doc, anchor);
        assert!(doc.element(anchor).unwrap().has_class(CURRENT_CLASS));
        clear_current(&mut doc, anchor);
        assert!(!doc.element(anchor).unwrap().has_class(CURRENT_CLASS));
    }

    #[test]
    fn test_wrap_element_text() {
        let mut doc = VerseDocument::parse(
            "<div class=\"verse-text\"><w strong=\"H430\">God</w> created</div>",
        )
        .unwrap();
        let verse = doc.verse_roots()[0];
        let w = doc.children(verse)[0];
        let wrapped = wrap_element_text(&mut doc, w).unwrap();
        assert_eq!(wrapped, 1);
        assert_eq!(
            doc.inner_markup(verse),
            "<w strong=\"H430\"><span class=\"search-hl first\">God</span></w> created"
        );
        assert_eq!(doc.text_content(verse), "God created");
    }
}
