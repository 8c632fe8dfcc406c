//! Commune - Direct Messaging Core
//!
//! One-to-one messaging between registered users: a persistent message
//! store, a conversation list derived from it, and a realtime delivery
//! channel that notifies connected recipients.
//!
//! # Module Structure
//!
//! - **`shared`** - Types shared between server and clients
//!   - `DirectMessage`, `ConversationEntry`, `UserSummary`
//!   - Socket frames (`ClientEvent`, `ServerEvent`)
//!   - Validation errors
//!
//! - **`backend`** - Server-side code (only compiled with `ssr` feature)
//!   - Axum HTTP API and WebSocket delivery channel
//!   - SQLite persistence through sqlx
//!   - JWT sessions and the user directory
//!
//! # Feature Flags
//!
//! - **`ssr`** - Enables the backend (on by default)
//!
//! # Usage
//!
//! ```rust,no_run
//! use commune::backend::server::{config::ServerConfig, init::create_app};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::load()?;
//! let app = create_app(&config).await?;
//! let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Delivery Guarantees
//!
//! The store is the source of truth. The socket channel is best-effort:
//! messages for users with no joined connection are dropped, and clients
//! reconcile by listing the thread.

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;
