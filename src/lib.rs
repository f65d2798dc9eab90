//! Verse Search - text search and highlighting inside rendered Bible chapters
//!
//! The crate parses a chapter's verse markup into a small document model,
//! locates occurrences of a search term with one of four strategies, wraps
//! them in highlight marker spans, and drives the debounced search box
//! session of the host application.
//!
//! A typical host wires it up like this:
//!
//! ```
//! use verse_search::{SearchConfig, SearchSession, VerseDocument};
//!
//! let mut doc = VerseDocument::parse(
//!     "<div class=\"verse-text\">In the beginning God created the heaven and the earth</div>",
//! )
//! .unwrap();
//! let mut session = SearchSession::new(SearchConfig {
//!     debounce_ms: 0,
//!     ..SearchConfig::default()
//! });
//!
//! session.input_changed(&mut doc, "beginning");
//! let total = session.poll(&mut doc, &mut ());
//! assert_eq!(total, Some(1));
//! ```

// Document model and markup parsing
pub mod document;

// Occurrence location strategies and highlight rendering
pub mod search;

// Debounced per-tab sessions
pub mod session;

// Configuration and errors
pub mod config;
pub mod error;

// Shared helpers
pub mod utils;

pub use config::SearchConfig;
pub use document::{NodeId, VerseDocument};
pub use error::{DocumentError, DocumentResult, EngineResult, SearchError};
pub use search::{
    Occurrence, SearchMode, SearchOptions, TextSegment, VerseSearchEngine,
};
pub use session::{SearchSession, SessionId, SessionPhase, Viewport};
