//! Shared Error Types
//!
//! Errors that can be produced while building or decoding the wire types in
//! [`crate::shared`]. They carry no server context, so a client crate can use
//! them without pulling in the backend.
//!
//! # Error Categories
//!
//! - `ValidationError` - A field failed validation (empty content, bad id, ...)
//!
//! # Usage
//!
//! ```rust
//! use commune::shared::error::SharedError;
//!
//! let error = SharedError::validation("content", "Message content cannot be empty");
//! assert!(error.to_string().contains("content"));
//! ```
use thiserror::Error;

/// Shared error types that can occur in both client and server code
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SharedError {
    /// Data validation error
    #[error("Validation error in field '{field}': {message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },
}

impl SharedError {
    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }
}
