//! Authentication Module
//!
//! User directory, JWT sessions and the authentication endpoints.
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs      - Module exports and documentation
//! ├── users.rs    - User model, lookups and search
//! ├── sessions.rs - JWT token management
//! └── handlers/   - HTTP handlers
//! ```
//!
//! # Authentication Flow
//!
//! 1. **Signup**: username, email and password → user created → token returned
//! 2. **Login**: email (or username) and password → token returned and set as cookie
//! 3. **Me**: token → user info returned
//!
//! # Security
//!
//! - Passwords are hashed with bcrypt
//! - Tokens expire after the configured TTL (7 days by default)
//! - Invalid credentials return 401 without saying which part was wrong

/// User data model and database operations
pub mod users;

/// JWT token generation and validation
pub mod sessions;

/// HTTP handlers for authentication endpoints
pub mod handlers;

pub use handlers::{get_me, login, search, signup};
pub use handlers::{AuthResponse, LoginRequest, SignupRequest, UserResponse};
