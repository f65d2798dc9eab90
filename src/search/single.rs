//! Single-word occurrence location
//!
//! A single word cannot straddle a segment boundary, so this locator runs
//! against the verse's serialized markup as one string. Matches that land
//! inside markup rather than verse text are filtered by inspecting the first
//! character after the match:
//! - nothing left: the match ends the verse text, valid
//! - `>`: the match sits inside an open tag, rejected
//! - `<` opening a closing tag whose name starts with `d`: the match abuts a
//!   wrapper `div` boundary, rejected (closing tags with other names are not
//!   treated as boundaries; known gap)
//! - anything else: ordinary text, valid

use crate::search::SearchOptions;

/// A match located in a verse's serialized markup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkupMatch {
    /// Start byte offset in the markup string
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
}

impl MarkupMatch {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Locator for free-standing single words
#[derive(Debug, Clone)]
pub struct SingleWordLocator {
    /// Compiled pattern for the last term
    pattern: Option<regex::Regex>,
    /// Last term used (for caching)
    last_term: String,
    /// Last options used (for caching)
    last_options: SearchOptions,
}

impl SingleWordLocator {
    pub fn new() -> Self {
        Self {
            pattern: None,
            last_term: String::new(),
            last_options: SearchOptions::default(),
        }
    }

    /// Find every position where `term` occurs as verse text in `markup_text`
    pub fn locate(
        &mut self,
        markup_text: &str,
        term: &str,
        options: &SearchOptions,
    ) -> Vec<MarkupMatch> {
        if term.is_empty() {
            return Vec::new();
        }

        // Update cached pattern if needed
        if term != self.last_term || options != &self.last_options {
            self.update_pattern(term, options);
            self.last_term = term.to_string();
            self.last_options = options.clone();
        }

        let Some(ref pattern) = self.pattern else {
            return Vec::new();
        };

        let mut matches = Vec::new();
        for m in pattern.find_iter(markup_text) {
            if ends_outside_tag(markup_text, m.end()) {
                matches.push(MarkupMatch {
                    start: m.start(),
                    end: m.end(),
                });
            }
        }
        matches
    }

    /// Build the regex for the term and options
    fn update_pattern(&mut self, term: &str, options: &SearchOptions) {
        let escaped = regex::escape(term);
        let pattern = if options.word_boundaries {
            format!(r"\b{}\b", escaped)
        } else {
            escaped
        };

        let pattern = if options.case_sensitive {
            pattern
        } else {
            format!("(?i){}", pattern)
        };

        self.pattern = regex::Regex::new(&pattern).ok();
    }
}

impl Default for SingleWordLocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether a match ending at byte `end` lies in verse text rather than markup
fn ends_outside_tag(markup_text: &str, end: usize) -> bool {
    let mut rest = markup_text[end..].chars();
    match rest.next() {
        None => true,
        Some('>') => false,
        Some('<') => !(rest.next() == Some('/') && rest.next() == Some('d')),
        Some(_) => true,
    }
}
