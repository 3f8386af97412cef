//! Unified error types for the domain layer

use thiserror::Error;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Name cannot be used as a SQL identifier
    #[error("Invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    /// Validation failed (e.g., invalid field values)
    #[error("Validation failed: {0}")]
    Validation(String),
}

impl DomainError {
    /// Creates a validation error for a violated invariant.
    ///
    /// # Example
    /// ```ignore
    /// if capacity == 0 {
    ///     return Err(DomainError::validation("batch capacity must be positive"));
    /// }
    /// ```
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
