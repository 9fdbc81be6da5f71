//! Result and error types for the core library

use thiserror::Error;

/// Core library error type
///
/// Only the registry operations that go beyond plain field checks return
/// these. Entity transitions still report "no effect" through `bool`.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("User {0} is blocked")]
    Blocked(String),

    #[error("Book {0} is not available")]
    Unavailable(String),

    #[error("Loan {0} is already closed")]
    LoanClosed(String),

    #[error("Credential error: {0}")]
    Credential(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a credential error
    pub fn credential(msg: impl Into<String>) -> Self {
        Self::Credential(msg.into())
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;
