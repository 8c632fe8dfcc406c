/**
 * Backend Error Types
 *
 * Errors raised at the request boundary. Each variant maps to one HTTP
 * status; store failures are logged in full and reported to the client
 * with a generic message.
 *
 * # Status Mapping
 *
 * - `NotAuthenticated` - 401
 * - `NotFound` - 404
 * - `Conflict` - 409
 * - `SharedError::ValidationError`, `InvalidBody` - 400
 * - `StoreUnavailable` - 500
 */

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use thiserror::Error;

use crate::shared::SharedError;

/// Backend-specific error types
///
/// ```rust
/// use commune::backend::error::BackendError;
/// use axum::http::StatusCode;
///
/// let err = BackendError::not_found("User not found");
/// assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    /// Missing, invalid or expired session, or the session's user is gone
    #[error("Not authenticated")]
    NotAuthenticated,

    /// A referenced user does not resolve
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// Unique username or email already taken
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// Request body is not the expected JSON
    #[error("Invalid request body: {0}")]
    InvalidBody(#[from] JsonRejection),

    /// Validation error from the shared types
    #[error(transparent)]
    SharedError(#[from] SharedError),

    /// Persistence failure
    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] sqlx::Error),

    #[error("Password hashing failed: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

impl BackendError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Shorthand for a `SharedError::ValidationError`
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SharedError(SharedError::validation(field, message))
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotAuthenticated => StatusCode::UNAUTHORIZED,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
            Self::SharedError(SharedError::ValidationError { .. }) => StatusCode::BAD_REQUEST,
            Self::StoreUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::PasswordHash(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Token(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to the client
    pub fn message(&self) -> String {
        match self {
            Self::NotAuthenticated => "Not authenticated".to_string(),
            Self::NotFound { message } => message.clone(),
            Self::Conflict { message } => message.clone(),
            Self::InvalidBody(rejection) => rejection.body_text(),
            Self::SharedError(SharedError::ValidationError { message, .. }) => message.clone(),
            Self::StoreUnavailable(_) => "Storage is temporarily unavailable".to_string(),
            Self::PasswordHash(_) | Self::Token(_) => {
                "Internal server error".to_string()
            }
        }
    }

    /// Whether the detail should be logged server-side
    pub fn is_internal(&self) -> bool {
        self.status_code().is_server_error()
    }
}
