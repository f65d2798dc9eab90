//! Text segment collection
//!
//! Walks one verse's subtree and gathers the text payloads that belong to the
//! verse text proper, skipping presentation-only content such as verse
//! numbers, footnote calls and cross references. The collector never mutates
//! the document; collected handles stay valid until a highlight pass edits
//! the verse.

use crate::document::{NodeId, VerseDocument};
use crate::search::TextSegment;

/// Element tags whose direct text payloads are searchable
const SEARCHABLE_TAGS: &[&str] = &["w", "q", "seg"];

/// Element classes whose direct text payloads are searchable
const SEARCHABLE_CLASSES: &[&str] = &["verse-text", "quote", "seg", "transchange"];

/// Collect the searchable text segments below `verse` in document order
pub fn collect(doc: &VerseDocument, verse: NodeId) -> Vec<TextSegment> {
    let mut collected = Vec::new();
    for id in doc.text_nodes_under(verse) {
        let Some(parent) = doc.parent(id) else {
            continue;
        };
        if !is_searchable_parent(doc, parent) {
            continue;
        }
        if let Some(text) = doc.text(id) {
            collected.push(TextSegment {
                text: text.to_string(),
                node: id,
            });
        }
    }
    collected
}

fn is_searchable_parent(doc: &VerseDocument, id: NodeId) -> bool {
    let Some(el) = doc.element(id) else {
        return false;
    };
    if SEARCHABLE_TAGS.contains(&el.tag()) {
        return true;
    }
    el.classes().any(|c| SEARCHABLE_CLASSES.contains(&c))
}
