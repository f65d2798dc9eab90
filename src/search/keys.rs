//! Exact-key lookup over per-word annotations
//!
//! Study-tool identifiers (lexical keys) are attached to inline word elements
//! as attribute metadata, not as visible text, so this locator walks elements
//! rather than scanning text.

use crate::document::{NodeId, VerseDocument};

/// Tag of elements that carry lexical annotations
pub const ANNOTATION_TAG: &str = "w";

/// Attribute holding the whitespace-separated key list
pub const KEY_ATTR: &str = "strong";

/// Annotated elements below `verse` in document order
pub fn annotated_elements(doc: &VerseDocument, verse: NodeId) -> Vec<NodeId> {
    doc.descendants(verse)
        .into_iter()
        .filter(|id| {
            doc.element(*id)
                .map(|el| el.tag() == ANNOTATION_TAG)
                .unwrap_or(false)
        })
        .collect()
}

/// Keys attached to one annotated element
pub fn keys_for(doc: &VerseDocument, id: NodeId) -> Vec<String> {
    doc.element(id)
        .and_then(|el| el.attr(KEY_ATTR))
        .map(|v| v.split_whitespace().map(|k| k.to_string()).collect())
        .unwrap_or_default()
}

/// Locate every annotated element whose key list contains `term` verbatim,
/// in document order. Keys are identifiers, so the comparison is exact; the
/// case-sensitivity and word-boundary options do not apply here.
pub fn locate(doc: &VerseDocument, verse: NodeId, term: &str) -> Vec<NodeId> {
    let mut hits = Vec::new();
    if term.is_empty() {
        return hits;
    }
    for id in annotated_elements(doc, verse) {
        if keys_for(doc, id).iter().any(|k| k == term) {
            hits.push(id);
        }
    }
    hits
}
