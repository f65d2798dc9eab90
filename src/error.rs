//! Error types for verse search
//!
//! This module defines all custom error types used throughout the crate.
//! Error types are organized by category for clear error handling and user-friendly messages.

use crate::document::NodeId;
use thiserror::Error;

/// Main search error type encompassing all error categories
#[derive(Error, Debug)]
pub enum SearchError {
    /// Document model errors
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Generic unexpected error
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Document model errors
#[derive(Error, Debug)]
pub enum DocumentError {
    /// Verse markup could not be parsed
    #[error("Could not parse verse markup: {0}")]
    Parse(String),

    /// An element was expected but the node holds text
    #[error("Node {0} is not an element")]
    NotAnElement(NodeId),

    /// A text node was expected but the node holds an element
    #[error("Node {0} is not a text node")]
    NotAText(NodeId),

    /// The node has no parent, so it cannot be spliced or unwrapped
    #[error("Node {0} is not attached to a parent")]
    Detached(NodeId),
}

/// Result type alias for search operations
pub type EngineResult<T> = Result<T, SearchError>;

/// Result type alias for document operations
pub type DocumentResult<T> = Result<T, DocumentError>;

impl DocumentError {
    /// Create a user-friendly error message suitable for display in a status bar
    pub fn user_message(&self) -> String {
        match self {
            DocumentError::Parse(_) => {
                "The chapter content could not be read. It may use unsupported markup.".to_string()
            }
            _ => self.to_string(),
        }
    }
}
