//! Utilities module for verse search
//!
//! Shared helper functions and utilities including:
//! - Debouncing
//! - Text utilities

use std::time::Instant;

/// Trailing-edge debounce helper for rate-limiting search passes
///
/// Each call to [`arm`](Self::arm) restarts the delay; [`ready`](Self::ready)
/// reports true once the delay has elapsed without another arm, then disarms.
#[derive(Debug)]
pub struct Debouncer {
    delay_ms: u64,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            deadline: None,
        }
    }

    /// Start (or restart) the delay from now
    pub fn arm(&mut self) {
        let deadline = Instant::now() + std::time::Duration::from_millis(self.delay_ms);
        self.deadline = Some(deadline);
    }

    /// Check whether the delay has elapsed; disarms on the first true
    pub fn ready(&mut self) -> bool {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Discard any pending delay
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Whether a delay is currently pending
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }
}

/// Text utilities
pub mod text {
    /// Collapse runs of whitespace to single spaces and trim the ends
    pub fn collapse_whitespace(text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debouncer_zero_delay() {
        let mut debouncer = Debouncer::new(0);
        debouncer.arm();
        assert!(debouncer.ready());
        assert!(!debouncer.ready());
    }

    #[test]
    fn test_debouncer_pending() {
        let mut debouncer = Debouncer::new(60_000);
        debouncer.arm();
        assert!(debouncer.is_armed());
        assert!(!debouncer.ready());
        assert!(debouncer.is_armed());
    }

    #[test]
    fn test_debouncer_cancel() {
        let mut debouncer = Debouncer::new(0);
        debouncer.arm();
        debouncer.cancel();
        assert!(!debouncer.is_armed());
        assert!(!debouncer.ready());
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(text::collapse_whitespace("In  the\n beginning "), "In the beginning");
        assert_eq!(text::collapse_whitespace("   "), "");
    }
}
