//! Shared Module
//!
//! Types shared between the server and any client: the message and
//! conversation wire structures, the realtime socket frames, and the
//! validation errors they can produce. Nothing here depends on the `ssr`
//! feature.

/// Real-time socket frames
pub mod event;

/// Shared error types
pub mod error;

/// Direct message, conversation and user summary types
pub mod messaging;

/// Re-export commonly used types for convenience
pub use error::SharedError;
pub use event::{ChannelErrorCode, ClientEvent, ServerEvent};
pub use messaging::{ConversationEntry, DirectMessage, UserSummary};
