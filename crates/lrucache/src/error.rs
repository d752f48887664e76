//! Error types for lrucache

use std::fmt;

/// Result type alias for lrucache operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for cache and recency list operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// `touch` on a key that has no node in the recency list
    NotFound,

    /// `remove_lru` on an empty recency list
    Empty,

    /// `add` on a key that already has a node
    DuplicateKey,

    /// Cache capacity must be at least 1
    InvalidCapacity(usize),

    /// Malformed trace text
    Parse {
        /// 1-based line number
        line: usize,
        /// What went wrong
        message: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotFound => write!(f, "Key not found in recency list"),
            Error::Empty => write!(f, "Recency list is empty"),
            Error::DuplicateKey => write!(f, "Key already present in recency list"),
            Error::InvalidCapacity(cap) => {
                write!(f, "Invalid capacity: {} (must be greater than 0)", cap)
            }
            Error::Parse { line, message } => write!(f, "Parse error on line {}: {}", line, message),
        }
    }
}

impl std::error::Error for Error {}
