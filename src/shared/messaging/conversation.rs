//! Conversation Data Structure
//!
//! A conversation is derived, never stored: the latest message between the
//! requesting user and one counterpart.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::message::DirectMessage;
use super::user::UserSummary;

/// One row of the conversation list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConversationEntry {
    /// The other participant
    pub user: UserSummary,
    pub last_message: DirectMessage,
    /// Equal to `last_message.created_at`; the list is sorted on it
    pub updated_at: DateTime<Utc>,
    /// Unread messages addressed to the requesting user in this conversation
    pub unread_count: u32,
}

/// Response for `GET /api/conversations`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListConversationsResponse {
    pub conversations: Vec<ConversationEntry>,
}

/// Body of `POST /api/conversations`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartConversationRequest {
    pub receiver_id: String,
}

/// Response of `POST /api/conversations`
///
/// Nothing is created; `exists` tells the client whether there is history
/// to load for the pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StartConversationResponse {
    pub success: bool,
    pub exists: bool,
}
