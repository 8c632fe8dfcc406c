//! Direct Message Data Structure
//!
//! A single directed message between two users. This is the record the
//! message store persists, the HTTP API returns, and the realtime channel
//! carries as a copy.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::UserSummary;
use crate::shared::error::SharedError;

/// Longest accepted message body, in characters
pub const MAX_CONTENT_CHARS: usize = 10_000;

/// A direct message from `sender_id` to `receiver_id`
///
/// `sender` and `receiver` are display summaries attached when the message
/// leaves the server. They are never stored and are optional on input.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DirectMessage {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    /// Flips to `true` once the receiver has fetched the thread; never back
    #[serde(default)]
    pub read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<UserSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver: Option<UserSummary>,
}

impl DirectMessage {
    /// Build a new unread message stamped with the current time
    ///
    /// The timestamp is truncated to microseconds, the precision it is
    /// stored with.
    pub fn new(sender_id: Uuid, receiver_id: Uuid, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender_id,
            receiver_id,
            content: content.into(),
            created_at: Utc::now().trunc_subsecs(6),
            read: false,
            sender: None,
            receiver: None,
        }
    }

    /// Whether `user_id` is on either end of this message
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.sender_id == user_id || self.receiver_id == user_id
    }

    /// The other party of this message as seen from `user_id`
    pub fn counterpart(&self, user_id: Uuid) -> Uuid {
        if self.sender_id == user_id {
            self.receiver_id
        } else {
            self.sender_id
        }
    }

    /// Attach sender/receiver display summaries
    pub fn with_participants(
        mut self,
        sender: Option<UserSummary>,
        receiver: Option<UserSummary>,
    ) -> Self {
        self.sender = sender;
        self.receiver = receiver;
        self
    }
}

/// Check a message body before it is stored
pub fn validate_content(content: &str) -> Result<(), SharedError> {
    if content.trim().is_empty() {
        return Err(SharedError::validation("content", "Message content cannot be empty"));
    }
    if content.chars().count() > MAX_CONTENT_CHARS {
        return Err(SharedError::validation(
            "content",
            format!("Message content exceeds {} characters", MAX_CONTENT_CHARS),
        ));
    }
    Ok(())
}

/// Parse a user id coming from a path segment or request body
pub fn parse_user_id(field: &str, raw: &str) -> Result<Uuid, SharedError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| SharedError::validation(field, format!("'{}' is not a valid user id", raw)))
}

/// Body of `POST /api/messages`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    /// Kept as text so a malformed id is reported as a validation error
    pub receiver_id: String,
    pub content: String,
}

/// Response of `GET /api/messages/{userId}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListMessagesResponse {
    pub messages: Vec<DirectMessage>,
}
