//! Error types for the caskdir index.

use std::collections::TryReserveError;
use thiserror::Error;

/// The result type used throughout caskdir.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for index operations.
///
/// Everything except [`Error::Allocation`] is an expected outcome of
/// normal operation and is returned as an ordinary value; the caller
/// decides whether "not found" is an error or just a miss.
#[derive(Debug, Error)]
pub enum Error {
    /// The requested key is not present in the index.
    #[error("key not found")]
    KeyNotFound,

    /// A delete was attempted before any entry was ever inserted.
    #[error("empty index")]
    EmptyIndex,

    /// An expansion was requested while a rehash is already in progress.
    /// Expansions never overlap; retry after migration completes.
    #[error("rehash already in progress")]
    RehashInProgress,

    /// A bucket array could not be allocated.
    #[error("bucket array allocation failed: {0}")]
    Allocation(#[from] TryReserveError),

    /// An invalid configuration value was provided.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Creates a new configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }
}
