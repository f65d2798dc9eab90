//! Verse search module
//!
//! Handles in-document search functionality including:
//! - Text segment collection from rendered verse markup
//! - Single-word, all-words, exact-phrase and lexical-key occurrence location
//! - Highlight rendering and clearing
//! - Per-verse search orchestration

pub mod engine;
pub mod highlight;
pub mod keys;
pub mod phrase;
pub mod segments;
pub mod single;

pub use engine::VerseSearchEngine;
pub use phrase::{PhraseMatch, PhraseOutcome};
pub use single::{MarkupMatch, SingleWordLocator};

use crate::document::NodeId;
use serde::{Deserialize, Serialize};

/// How a search term is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SearchMode {
    /// One standalone word, located against the verse's rendered markup
    SingleWord,
    /// Every word must appear somewhere in the verse, in any order
    #[default]
    AllWords,
    /// The words must appear in order as a contiguous phrase
    ExactPhrase,
    /// Lexical-key lookup against per-word annotations, no text scanning
    ExactKey,
}

/// Options controlling a search pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SearchOptions {
    /// Term interpretation
    pub mode: SearchMode,
    /// Case-sensitive matching
    pub case_sensitive: bool,
    /// Match whole words only
    pub word_boundaries: bool,
    /// Tolerate partial matches instead of requiring the whole term
    pub extended_boundaries: bool,
    /// Highlight the tokens of an incomplete match (extended mode only)
    pub highlight_partial: bool,
}

/// One searchable fragment of a verse's rendered text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSegment {
    /// The text payload as rendered
    pub text: String,
    /// Handle of the text node the payload came from
    pub node: NodeId,
}

/// One located token occurrence within a segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    /// Index into the segment list
    pub segment: usize,
    /// Byte offset of the match within the segment text
    pub offset: usize,
    /// The matched substring, case as found
    pub text: String,
    /// Whether this hit opens a phrase occurrence (navigation anchor)
    pub first_of_phrase: bool,
}

/// Word characters for boundary checks
pub(crate) fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
