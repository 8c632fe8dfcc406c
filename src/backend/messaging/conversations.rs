/**
 * Conversation Aggregator
 *
 * Derives a user's conversation list from the message store: one entry per
 * counterpart, holding the latest message exchanged with them, newest
 * conversation first. Nothing is persisted.
 *
 * The grouping step is a pure function over messages so its ordering and
 * uniqueness can be checked without a database.
 */

use std::collections::HashMap;

use sqlx::SqlitePool;
use uuid::Uuid;

use super::db;
use crate::backend::auth::users::{resolve_user, resolve_users};
use crate::backend::error::BackendError;
use crate::shared::messaging::{ConversationEntry, DirectMessage};

/// Latest message with one counterpart, before user resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationGroup {
    pub counterpart_id: Uuid,
    pub last_message: DirectMessage,
    /// Unread messages addressed to the requesting user
    pub unread_count: u32,
}

/// Group stored messages by the other party as seen from `user_id`
///
/// Takes `(seq, message)` pairs. Within a group the latest message wins,
/// ties going to the later insertion, which is the thread's last message.
/// Groups come back newest first under the same order. Messages not
/// involving `user_id`, and messages to oneself, are ignored.
pub fn group_by_counterpart<I>(user_id: Uuid, messages: I) -> Vec<ConversationGroup>
where
    I: IntoIterator<Item = (i64, DirectMessage)>,
{
    let mut messages: Vec<(i64, DirectMessage)> = messages
        .into_iter()
        .filter(|(_, m)| m.involves(user_id) && m.sender_id != m.receiver_id)
        .collect();
    messages.sort_by(|(a_seq, a), (b_seq, b)| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b_seq.cmp(a_seq))
    });

    let mut positions: HashMap<Uuid, usize> = HashMap::new();
    let mut groups: Vec<ConversationGroup> = Vec::new();

    for (_, message) in messages {
        let counterpart_id = message.counterpart(user_id);
        let unread = u32::from(message.receiver_id == user_id && !message.read);

        match positions.get(&counterpart_id) {
            Some(&position) => groups[position].unread_count += unread,
            None => {
                positions.insert(counterpart_id, groups.len());
                groups.push(ConversationGroup {
                    counterpart_id,
                    last_message: message,
                    unread_count: unread,
                });
            }
        }
    }

    groups
}

/// Conversation list for `user_id`, newest first
///
/// Counterparts that no longer resolve are left out.
pub async fn list_conversations(
    pool: &SqlitePool,
    user_id: Uuid,
) -> Result<Vec<ConversationEntry>, BackendError> {
    let messages = db::fetch_messages_involving(pool, user_id).await?;
    let groups = group_by_counterpart(user_id, messages);
    if groups.is_empty() {
        return Ok(Vec::new());
    }

    let counterpart_ids: Vec<Uuid> = groups.iter().map(|g| g.counterpart_id).collect();
    let counterparts: HashMap<Uuid, _> = resolve_users(pool, &counterpart_ids)
        .await?
        .into_iter()
        .map(|summary| (summary.id, summary))
        .collect();
    let me = resolve_user(pool, user_id).await?;

    let entries: Vec<ConversationEntry> = groups
        .into_iter()
        .filter_map(|group| {
            let Some(user) = counterparts.get(&group.counterpart_id).cloned() else {
                tracing::debug!(
                    "Skipping conversation with unknown user {}",
                    group.counterpart_id
                );
                return None;
            };

            let last_message = if group.last_message.sender_id == user_id {
                group
                    .last_message
                    .with_participants(me.clone(), Some(user.clone()))
            } else {
                group
                    .last_message
                    .with_participants(Some(user.clone()), me.clone())
            };

            Some(ConversationEntry {
                updated_at: last_message.created_at,
                user,
                last_message,
                unread_count: group.unread_count,
            })
        })
        .collect();

    Ok(entries)
}
