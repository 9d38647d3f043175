//! Error types for thuum-common.

use thiserror::Error;

/// Common error type for Thuum operations.
#[derive(Debug, Error)]
pub enum Error {
    /// End of buffer reached while reading.
    #[error("unexpected end of buffer: needed {needed} bytes but only {available} available")]
    UnexpectedEof { needed: usize, available: usize },

    /// Missing null terminator in string.
    #[error("string missing null terminator")]
    MissingNullTerminator,

    /// Invalid form ID text.
    #[error("invalid form ID: {0}")]
    InvalidFormId(String),
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
