//! User Summary
//!
//! The display slice of a user that the messaging layer attaches to messages
//! and conversation entries.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Display metadata for a user, as resolved from the user directory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    /// Name shown in chat headers and the conversation list
    pub display_name: String,
    pub avatar_url: String,
}

/// Response for `GET /api/users/search`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchUsersResponse {
    pub users: Vec<UserSummary>,
}
