//! Error types for objcat core.

use thiserror::Error;

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors that can occur in catalog operations.
///
/// Only programmer errors are reported. A lookup that matches nothing, a key
/// of the wrong type, an object that has been reclaimed, or any call on a
/// disposed catalog all resolve to empty results instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// An argument was rejected before any state changed.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the rejected argument.
        message: String,
    },
}

impl CatalogError {
    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Validates an access key. Empty and whitespace-only keys are rejected.
    pub(crate) fn check_access_key(access_key: &str) -> CatalogResult<&str> {
        if access_key.trim().is_empty() {
            return Err(Self::invalid_argument(
                "access key cannot be empty or whitespace",
            ));
        }
        Ok(access_key)
    }
}
