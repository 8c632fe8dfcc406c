/**
 * Realtime Channel Events
 *
 * Frames exchanged over the delivery socket. Every frame is a JSON text
 * frame of the form `{"event": "<name>", "data": <payload>}`.
 *
 * The client authenticates (unless the token came with the upgrade
 * request), joins its own room, and may republish messages it has already
 * stored through the HTTP API so the receiver is notified.
 */
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::messaging::DirectMessage;

/// Frames sent by a client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Present a session token when the upgrade request carried none
    Authenticate { token: String },
    /// Register this connection in the user's delivery room
    Join(Uuid),
    /// Route an already-stored message to its receiver's room
    SendMessage(DirectMessage),
}

/// Frames sent by the server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    Authenticated(Identity),
    Joined(Identity),
    ReceiveMessage(DirectMessage),
    Error(ChannelErrorPayload),
}

/// `{"userId": ...}` payload of `authenticated` and `joined`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: Uuid,
}

/// Machine-readable reason attached to an `error` frame
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChannelErrorCode {
    /// Frame could not be parsed
    BadRequest,
    /// No valid session for this connection
    Unauthorized,
    /// Acting on behalf of another user
    Forbidden,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChannelErrorPayload {
    pub code: ChannelErrorCode,
    pub message: String,
}

impl ServerEvent {
    pub fn authenticated(user_id: Uuid) -> Self {
        Self::Authenticated(Identity { user_id })
    }

    pub fn joined(user_id: Uuid) -> Self {
        Self::Joined(Identity { user_id })
    }

    pub fn error(code: ChannelErrorCode, message: impl Into<String>) -> Self {
        Self::Error(ChannelErrorPayload {
            code,
            message: message.into(),
        })
    }

    /// Encode as the JSON text of a socket frame
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl ClientEvent {
    /// Decode a socket text frame
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
