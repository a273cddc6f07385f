//! Shared primitives for all Rust crates in Hookforge.

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type used across Hookforge crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Caller exhausted its request quota for the active window.
    #[error("rate limited until {reset_at_ms}")]
    RateLimited {
        /// Epoch milliseconds at which capacity frees up again.
        reset_at_ms: i64,
    },

    /// Shared rate limit store could not complete the operation.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Text generation collaborator failed or returned unusable output.
    #[error("upstream generation failure: {0}")]
    Upstream(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns true for infrastructure faults that callers cannot correct.
    #[must_use]
    pub fn is_infrastructure_fault(&self) -> bool {
        matches!(
            self,
            Self::StorageUnavailable(_) | Self::Upstream(_) | Self::Internal(_)
        )
    }
}
