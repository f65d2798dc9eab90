//! Search configuration
//!
//! Tunable values for the search pipeline. A `SearchConfig` is created once per
//! tab session; the constants here are its defaults.

use serde::{Deserialize, Serialize};

/// Minimum search term length in characters; shorter input clears the session
pub const MIN_TERM_LEN: usize = 3;

/// Delay between the last keystroke and the search pass, in milliseconds
pub const DEFAULT_DEBOUNCE_MS: u64 = 200;

/// Debounce delay on constrained platforms where each pass is expensive
pub const CONSTRAINED_DEBOUNCE_MS: u64 = 800;

/// Upper bound on scan attempts within a single text segment during a phrase pass
pub const MAX_SEGMENT_PASSES: usize = 20;

/// Characters of slack allowed between adjacent phrase tokens
pub const ADJACENCY_TOLERANCE: usize = 2;

/// Per-session search configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Delay between input changes and the search pass, in milliseconds
    pub debounce_ms: u64,

    /// Minimum term length before a search runs
    pub min_term_len: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            min_term_len: MIN_TERM_LEN,
        }
    }
}

impl SearchConfig {
    /// Configuration for constrained platforms (longer debounce, same term rules)
    pub fn constrained() -> Self {
        Self {
            debounce_ms: CONSTRAINED_DEBOUNCE_MS,
            ..Self::default()
        }
    }
}
