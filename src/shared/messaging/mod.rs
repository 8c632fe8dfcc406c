//! Messaging Module
//!
//! Data structures for direct messaging:
//!
//! - `DirectMessage` - A message between two users
//! - `ConversationEntry` - The latest message with one counterpart
//! - `UserSummary` - Display metadata attached to both
//!
//! # Usage
//!
//! ```rust
//! use commune::shared::messaging::{ConversationEntry, DirectMessage, UserSummary};
//! ```

pub mod conversation;
pub mod message;
pub mod user;

pub use conversation::{
    ConversationEntry, ListConversationsResponse, StartConversationRequest,
    StartConversationResponse,
};
pub use message::{
    parse_user_id, validate_content, DirectMessage, ListMessagesResponse, SendMessageRequest,
    MAX_CONTENT_CHARS,
};
pub use user::{SearchUsersResponse, UserSummary};
