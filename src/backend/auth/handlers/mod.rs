//! Authentication Handlers Module
//!
//! # Module Structure
//!
//! ```text
//! handlers/
//! ├── mod.rs    - Module exports and documentation
//! ├── types.rs  - Request and response types
//! ├── signup.rs - User registration handler
//! ├── login.rs  - User authentication handler
//! ├── me.rs     - Get current user handler
//! └── search.rs - User search handler
//! ```
//!
//! # Handlers
//!
//! - **`signup`** - POST /api/auth/signup
//! - **`login`** - POST /api/auth/login
//! - **`get_me`** - GET /api/auth/me
//! - **`search`** - GET /api/users/search

/// Request and response types
pub mod types;

/// Signup handler
pub mod signup;

/// Login handler
pub mod login;

/// Get current user handler
pub mod me;

/// User search handler
pub mod search;

pub use types::{AuthResponse, LoginRequest, SignupRequest, UserResponse};

pub use login::login;
pub use me::get_me;
pub use search::search;
pub use signup::signup;
