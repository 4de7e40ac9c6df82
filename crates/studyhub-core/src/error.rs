//! State store error types.
//!
//! Defined in `studyhub-core` so both the server (HTTP status mapping)
//! and tests can match on variants without string matching.

use thiserror::Error;

/// Errors that can occur when reading or writing a client's state record.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A slug did not match any branch in the catalog.
    #[error("unknown branch slug: {0}")]
    UnknownSlug(String),

    /// The underlying persistence layer failed.
    #[error("storage error: {0}")]
    Storage(String),
}

impl StoreError {
    /// Returns `true` if this error maps to HTTP 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::UnknownSlug(_))
    }

    /// The HTTP status code this error maps to.
    pub fn status_code(&self) -> u16 {
        match self {
            StoreError::UnknownSlug(_) => 404,
            StoreError::Storage(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(StoreError::UnknownSlug("x".into()).status_code(), 404);
        assert_eq!(StoreError::Storage("disk".into()).status_code(), 500);
        assert!(StoreError::UnknownSlug("x".into()).is_not_found());
        assert!(!StoreError::Storage("disk".into()).is_not_found());
    }
}
