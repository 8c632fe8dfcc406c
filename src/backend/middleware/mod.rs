//! Middleware Module
//!
//! Request processing that runs before handlers.
//!
//! - **`auth`** - Session token verification for protected routes

pub mod auth;

pub use auth::{auth_middleware, AuthUser, AuthenticatedUser};
