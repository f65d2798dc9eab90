//! Per-tab search session
//!
//! A session owns everything one search box drives: the debounced input
//! handling, the engine, the shown occurrences, and the navigation cursor.
//! The host uses it in three steps: feed keystrokes to
//! [`SearchSession::input_changed`], call [`SearchSession::poll`] from its
//! tick, and route next/previous actions to the navigation methods.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::SearchConfig;
use crate::document::{NodeId, VerseDocument};
use crate::search::engine::VerseSearchEngine;
use crate::search::{highlight, SearchOptions};
use crate::utils::Debouncer;

/// Unique identifier for search sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Create a new unique session ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What the session is currently doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionPhase {
    /// No active term
    #[default]
    Idle,
    /// A pass is running
    Searching,
    /// A pass has finished and its highlights are shown
    ResultsShown,
}

/// Results of the last completed pass
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    /// The term the highlights belong to
    pub term: Option<String>,

    /// Options the term was searched with
    pub options: SearchOptions,

    /// Anchor markers in document order
    pub occurrences: Vec<NodeId>,

    /// Index of the navigated-to occurrence
    pub current: Option<usize>,
}

/// Scrolling hook the host view implements
pub trait Viewport {
    /// Bring the given node into view
    fn scroll_into_view(&mut self, node: NodeId);
}

/// No-op viewport for headless use
impl Viewport for () {
    fn scroll_into_view(&mut self, _node: NodeId) {}
}

/// Debounced search session for one tab
#[derive(Debug)]
pub struct SearchSession {
    /// Unique identifier for this session
    id: SessionId,

    /// Session configuration
    config: SearchConfig,

    /// The engine running each pass
    engine: VerseSearchEngine,

    /// Results of the last pass
    state: SearchState,

    /// Current phase
    phase: SessionPhase,

    /// Keystroke debouncer
    debouncer: Debouncer,

    /// Term waiting for the debounce delay to elapse
    pending: Option<String>,
}

impl SearchSession {
    /// Create a new session with the given configuration
    pub fn new(config: SearchConfig) -> Self {
        let debouncer = Debouncer::new(config.debounce_ms);
        Self {
            id: SessionId::new(),
            config,
            engine: VerseSearchEngine::new(),
            state: SearchState::default(),
            phase: SessionPhase::Idle,
            debouncer,
            pending: None,
        }
    }

    /// Get the session ID
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Get the current phase
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Get the term the shown highlights belong to
    pub fn term(&self) -> Option<&str> {
        self.state.term.as_deref()
    }

    /// Get the current search options
    pub fn options(&self) -> &SearchOptions {
        &self.state.options
    }

    /// Get the number of shown occurrences
    pub fn occurrence_count(&self) -> usize {
        self.state.occurrences.len()
    }

    /// Get the current occurrence number (1-indexed)
    pub fn current_occurrence_number(&self) -> Option<usize> {
        self.state.current.map(|i| i + 1)
    }

    /// Position indicator for the search bar, like "3/17"
    pub fn position_label(&self) -> String {
        match self.state.current {
            Some(i) => format!("{}/{}", i + 1, self.state.occurrences.len()),
            None => "0/0".to_string(),
        }
    }

    /// Handle a change of the search box content. Short input clears the
    /// session; anything else is scheduled behind the debounce delay.
    pub fn input_changed(&mut self, doc: &mut VerseDocument, input: &str) {
        let trimmed = input.trim();
        if trimmed.chars().count() < self.config.min_term_len {
            self.debouncer.cancel();
            self.pending = None;
            self.reset(doc);
            return;
        }
        if Some(trimmed) == self.state.term.as_deref() {
            return;
        }
        self.pending = Some(trimmed.to_string());
        self.debouncer.arm();
    }

    /// Run the pending search if its debounce delay has elapsed. Returns the
    /// occurrence total of the pass that ran, if one did.
    pub fn poll(&mut self, doc: &mut VerseDocument, view: &mut impl Viewport) -> Option<usize> {
        if !self.debouncer.ready() {
            return None;
        }
        let term = self.pending.take()?;
        Some(self.search_now(doc, view, &term))
    }

    /// Run a pass immediately, bypassing the debounce. Clears the previous
    /// pass's highlights first and navigates to the first occurrence.
    pub fn search_now(
        &mut self,
        doc: &mut VerseDocument,
        view: &mut impl Viewport,
        term: &str,
    ) -> usize {
        self.phase = SessionPhase::Searching;
        self.debouncer.cancel();
        self.pending = None;

        highlight::clear_highlights(doc, doc.root());
        self.state.occurrences.clear();
        self.state.current = None;

        let mut total = 0usize;
        for verse in doc.verse_roots() {
            match self.engine.search_verse(doc, verse, term, &self.state.options) {
                Ok(count) => total += count,
                Err(e) => log::warn!("[{}] skipping verse {}: {}", self.id, verse, e),
            }
        }

        self.state.term = Some(term.to_string());
        self.state.occurrences = highlight::collect_anchors(doc, doc.root());
        if let Some(&first) = self.state.occurrences.first() {
            self.state.current = Some(0);
            highlight::set_current(doc, first);
            view.scroll_into_view(first);
        }
        self.phase = SessionPhase::ResultsShown;
        log::debug!(
            "[{}] pass for {:?} found {} occurrences",
            self.id,
            term,
            total
        );
        total
    }

    /// Move to the next occurrence, wrapping at the end
    pub fn next_occurrence(&mut self, doc: &mut VerseDocument, view: &mut impl Viewport) {
        self.navigate(doc, view, true);
    }

    /// Move to the previous occurrence, wrapping at the start
    pub fn prev_occurrence(&mut self, doc: &mut VerseDocument, view: &mut impl Viewport) {
        self.navigate(doc, view, false);
    }

    fn navigate(&mut self, doc: &mut VerseDocument, view: &mut impl Viewport, forward: bool) {
        let len = self.state.occurrences.len();
        if len == 0 {
            return;
        }
        let Some(current) = self.state.current else {
            return;
        };
        let next = if forward {
            (current + 1) % len
        } else if current == 0 {
            len - 1
        } else {
            current - 1
        };

        if let Some(&old) = self.state.occurrences.get(current) {
            highlight::clear_current(doc, old);
        }
        if let Some(&anchor) = self.state.occurrences.get(next) {
            highlight::set_current(doc, anchor);
            view.scroll_into_view(anchor);
        }
        self.state.current = Some(next);
    }

    /// Change the search options. If results are shown, the pass is rerun
    /// with the shown term so the highlights match the new options.
    pub fn set_options(
        &mut self,
        doc: &mut VerseDocument,
        view: &mut impl Viewport,
        options: SearchOptions,
    ) {
        if options == self.state.options {
            return;
        }
        self.state.options = options;
        if self.phase == SessionPhase::ResultsShown {
            if let Some(term) = self.state.term.clone() {
                self.search_now(doc, view, &term);
            }
        }
    }

    /// Clear the shown results and return to idle. Options are kept.
    pub fn reset(&mut self, doc: &mut VerseDocument) {
        self.debouncer.cancel();
        self.pending = None;
        highlight::clear_highlights(doc, doc.root());
        self.state.term = None;
        self.state.occurrences.clear();
        self.state.current = None;
        self.phase = SessionPhase::Idle;
    }
}

impl Default for SearchSession {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}
