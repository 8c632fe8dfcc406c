//! Messaging Module
//!
//! Direct messages between two users: the store that persists them, the
//! conversation list derived from it, and the HTTP handlers for both.
//!
//! ```text
//! messaging/
//! ├── db.rs            - SQL for the direct_messages table
//! ├── store.rs         - Send, list thread (acknowledging reads), thread check
//! ├── conversations.rs - Per-counterpart conversation list
//! └── handlers.rs      - HTTP handlers
//! ```

pub mod conversations;
pub mod db;
pub mod handlers;
pub mod store;

pub use conversations::{group_by_counterpart, list_conversations, ConversationGroup};
pub use store::{list_thread, send_message, thread_exists};
