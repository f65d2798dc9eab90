//! Per-verse search dispatch
//!
//! One engine instance serves a whole pass over the document: it owns the
//! cached single-word locator and routes a term to the strategy the options
//! select, then hands the matches to the highlight renderer.

use crate::document::{NodeId, VerseDocument};
use crate::error::{DocumentError, EngineResult};
use crate::search::highlight::{self, WrapRange};
use crate::search::single::SingleWordLocator;
use crate::search::{keys, phrase, segments, Occurrence, SearchMode, SearchOptions};

/// Verse-scoped search and highlight engine
#[derive(Debug, Default)]
pub struct VerseSearchEngine {
    single: SingleWordLocator,
}

impl VerseSearchEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Search one verse for `term` and highlight the matches in place.
    /// Returns the number of occurrences found.
    pub fn search_verse(
        &mut self,
        doc: &mut VerseDocument,
        verse: NodeId,
        term: &str,
        options: &SearchOptions,
    ) -> EngineResult<usize> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(0);
        }
        if doc.element(verse).is_none() {
            return Err(DocumentError::NotAnElement(verse).into());
        }

        // Rendered non-breaking spaces would keep a space-separated term
        // from matching, so fold them before any strategy runs.
        doc.normalize_nbsp_under(verse);

        match options.mode {
            SearchMode::SingleWord => self.search_single_word(doc, verse, term, options),
            SearchMode::AllWords => self.search_all_words(doc, verse, term, options),
            SearchMode::ExactPhrase => search_exact_phrase(doc, verse, term, options),
            SearchMode::ExactKey => search_exact_key(doc, verse, term),
        }
    }

    fn search_single_word(
        &mut self,
        doc: &mut VerseDocument,
        verse: NodeId,
        term: &str,
        options: &SearchOptions,
    ) -> EngineResult<usize> {
        let markup_text = doc.inner_markup(verse);
        let matches = self.single.locate(&markup_text, term, options);
        let ranges: Vec<WrapRange> = matches
            .iter()
            .map(|m| WrapRange {
                start: m.start,
                len: m.len(),
                first: true,
            })
            .collect();
        Ok(highlight::apply_to_markup(doc, verse, &markup_text, &ranges)?)
    }

    fn search_all_words(
        &mut self,
        doc: &mut VerseDocument,
        verse: NodeId,
        term: &str,
        options: &SearchOptions,
    ) -> EngineResult<usize> {
        let words: Vec<&str> = term.split(' ').filter(|w| !w.is_empty()).collect();
        let markup_text = doc.inner_markup(verse);

        let mut ranges: Vec<WrapRange> = Vec::new();
        let mut missing = false;
        for word in &words {
            let matches = self.single.locate(&markup_text, word, options);
            if matches.is_empty() {
                missing = true;
            }
            ranges.extend(matches.iter().map(|m| WrapRange {
                start: m.start,
                len: m.len(),
                first: true,
            }));
        }
        if missing && !options.extended_boundaries {
            return Ok(0);
        }
        Ok(highlight::apply_to_markup(doc, verse, &markup_text, &ranges)?)
    }
}

fn search_exact_phrase(
    doc: &mut VerseDocument,
    verse: NodeId,
    term: &str,
    options: &SearchOptions,
) -> EngineResult<usize> {
    let segments = segments::collect(doc, verse);
    let outcome = phrase::locate(&segments, term, options);

    if !outcome.matches.is_empty() {
        let hits: Vec<Occurrence> = outcome
            .matches
            .iter()
            .flat_map(|m| m.hits.iter().cloned())
            .collect();
        highlight::apply_to_segments(doc, &segments, &hits)?;
        return Ok(outcome.matches.len());
    }

    if options.extended_boundaries {
        if let Some(partial) = outcome.partial {
            if options.highlight_partial {
                highlight::apply_to_segments(doc, &segments, &partial.hits)?;
            }
            return Ok(partial.hits.len());
        }
    }
    Ok(0)
}

fn search_exact_key(doc: &mut VerseDocument, verse: NodeId, term: &str) -> EngineResult<usize> {
    let hits = keys::locate(doc, verse, term);
    for element in &hits {
        highlight::wrap_element_text(doc, *element)?;
    }
    Ok(hits.len())
}
