//! Error types for persistence operations.

use thiserror::Error;

/// Errors that can occur during persistence operations.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// I/O error, including truncated input (`UnexpectedEof`).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Format error (invalid magic bytes, version mismatch, corruption)
    #[error("format error: {0}")]
    Format(String),

    /// Decoded state is internally inconsistent (e.g. sequence length != n * K).
    #[error("invalid state: {0}")]
    InvalidState(String),
}

impl PersistenceError {
    /// Format error with an expected/actual suffix.
    pub(crate) fn mismatch(
        what: &str,
        expected: impl std::fmt::Display,
        actual: impl std::fmt::Display,
    ) -> Self {
        Self::Format(format!("{what} (expected: {expected}, actual: {actual})"))
    }
}

/// Result type for persistence operations.
pub type PersistenceResult<T> = Result<T, PersistenceError>;
