//! Error types for todo operations.

use crate::repository::RepositoryError;
use crate::todo::TodoId;
use thiserror::Error;

/// Errors produced by [`crate::service::TodoService`]
///
/// Each variant maps to exactly one HTTP status in the web layer:
/// `Validation` → 400, `NotFound` → 404, `Storage` → 500.
#[derive(Error, Debug)]
pub enum TodoError {
    /// A required field is missing, empty, or malformed
    #[error("{0}")]
    Validation(String),

    /// No todo has the referenced id
    #[error("Todo not found")]
    NotFound(TodoId),

    /// The backing store failed
    #[error("Storage failure: {0}")]
    Storage(#[from] RepositoryError),
}

impl TodoError {
    /// Creates a validation error with a user-facing message
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_is_displayed_verbatim() {
        let error = TodoError::validation("Title cannot be empty");
        assert_eq!(error.to_string(), "Title cannot be empty");
    }

    #[test]
    fn storage_error_wraps_repository_error() {
        let error: TodoError = RepositoryError::Database("connection refused".to_string()).into();
        assert!(error.to_string().contains("connection refused"));
    }
}
