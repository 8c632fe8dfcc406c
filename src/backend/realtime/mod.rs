//! Realtime Delivery Module
//!
//! Best-effort push of direct messages to connected recipients over a
//! WebSocket. The channel stores nothing: a message whose receiver has no
//! joined connection is dropped, and clients reconcile through the HTTP
//! API.
//!
//! # Module Structure
//!
//! ```text
//! realtime/
//! ├── mod.rs        - Module exports and documentation
//! ├── rooms.rs      - Room registry keyed by user id
//! ├── connection.rs - Per-connection state machine
//! └── socket.rs     - WebSocket upgrade and frame loop
//! ```
//!
//! # Events
//!
//! - `join(userId)` - Enter the caller's own room
//! - `send_message(message)` - Route a stored message to the receiver's room
//! - `receive_message(message)` - Delivered to every connection in that room

/// Room registry
pub mod rooms;

/// Connection state machine
pub mod connection;

/// WebSocket handler
pub mod socket;

pub use connection::{ChannelError, Connection, ConnectionState};
pub use rooms::DeliveryRooms;
pub use socket::handle_socket_upgrade;
