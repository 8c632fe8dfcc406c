//! Backend Module
//!
//! All server-side code: the Axum HTTP API, the WebSocket delivery
//! channel, SQLite persistence and authentication. Only compiled with the
//! `ssr` feature.
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── server/     - Configuration, state and app assembly
//! ├── routes/     - Router
//! ├── messaging/  - Message store and conversation aggregation
//! ├── realtime/   - Delivery rooms and socket connections
//! ├── auth/       - User directory, sessions, auth endpoints
//! ├── middleware/ - Authentication middleware
//! └── error/      - Error types
//! ```
//!
//! # State Management
//!
//! `AppState` holds the database pool, the delivery room registry and the
//! session keys. Handlers pull the part they need through `FromRef`.

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Message store and conversation list
pub mod messaging;

/// Realtime delivery channel
pub mod realtime;

/// Backend error types
pub mod error;

/// Authentication and user directory
pub mod auth;

/// Middleware for request processing
pub mod middleware;

pub use error::BackendError;
pub use server::create_app;
