//! Error types for lrucache

use std::fmt;

/// Result type alias for cache operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for cache operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Construction argument rejected (e.g. zero capacity)
    InvalidArgument(String),

    /// Lookup of a key that is not cached
    KeyNotFound(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            Error::KeyNotFound(key) => write!(f, "Key {} not found in cache", key),
        }
    }
}

impl std::error::Error for Error {}
