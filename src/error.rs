//! Error types for landmark.

use crate::persistence::PersistenceError;
use thiserror::Error;

/// Errors that can occur while building, loading or configuring an index.
///
/// Searches never fail: degenerate inputs (empty datasets, oversized `k`)
/// are clamped instead.
#[derive(Debug, Error)]
pub enum RetrieveError {
    /// Invalid parameter value (e.g. `k` larger than the landmark count).
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Saving or loading an index failed.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl From<std::io::Error> for RetrieveError {
    fn from(e: std::io::Error) -> Self {
        Self::Persistence(PersistenceError::Io(e))
    }
}

pub type Result<T> = std::result::Result<T, RetrieveError>;
