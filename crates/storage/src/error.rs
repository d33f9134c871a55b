//! Storage errors

use thiserror::Error;

/// Failure of a storage read or write
///
/// None of these are fatal to a page context: callers log them and carry
/// on with their cached state.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Embedded database failure
    #[error("database error: {0}")]
    Database(#[from] sled::Error),

    /// Stored value is not valid JSON
    #[error("encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// The store went away (e.g. the extension was reloaded under the page)
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}
