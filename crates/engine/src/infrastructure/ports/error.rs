//! Error types for port operations.

use stalker_domain::DomainError;

/// Repository operation errors with context for debugging.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// Could not reach the database after every connect attempt.
    #[error("Could not connect to database after {attempts} attempt(s): {message}")]
    Connection { attempts: u32, message: String },

    /// Database operation failed - includes operation name for tracing.
    #[error("Database error in {operation}: {message}")]
    Database {
        operation: &'static str,
        message: String,
    },

    /// Entity not found - includes entity type and ID for actionable error messages.
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// A table or column name that cannot be used in SQL.
    #[error(transparent)]
    InvalidIdentifier(#[from] DomainError),

    /// Ad hoc query that is not a single read-only statement.
    #[error("Only single read-only statements are allowed: {0}")]
    ReadOnlyViolation(String),
}

impl RepoError {
    /// Create a NotFound error with entity type and ID context.
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }

    /// Create a Database error with operation context.
    pub fn database(operation: &'static str, message: impl ToString) -> Self {
        Self::Database {
            operation,
            message: message.to_string(),
        }
    }

    /// Check if this is a NotFound error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_carries_context() {
        let err = RepoError::not_found("Table", "artifacts");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Table not found: artifacts");
    }

    #[test]
    fn database_error_names_operation() {
        let err = RepoError::database("list_tables", "connection reset");
        assert!(!err.is_not_found());
        assert_eq!(
            err.to_string(),
            "Database error in list_tables: connection reset"
        );
    }

    #[test]
    fn domain_errors_convert() {
        let err: RepoError = DomainError::InvalidIdentifier("x y".into()).into();
        assert!(matches!(err, RepoError::InvalidIdentifier(_)));
    }
}
