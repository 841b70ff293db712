//! Error types for adapter setup.
//!
//! Operations on a running store report [`bgorg_domain::MeetingError`] or
//! [`bgorg_domain::IdentityError`]; `RepoError` only covers opening a backend.

/// Adapter construction errors with context for debugging.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// Database operation failed - includes operation name for tracing.
    #[error("Database error in {operation}: {message}")]
    Database {
        operation: &'static str,
        message: String,
    },
}

impl RepoError {
    /// Create a Database error with operation context.
    pub fn database(operation: &'static str, message: impl ToString) -> Self {
        Self::Database {
            operation,
            message: message.to_string(),
        }
    }
}
