/**
 * Message Store
 *
 * Sending, listing and checking direct message threads. This is the
 * source of truth for message history; the realtime channel only carries
 * copies.
 *
 * # Read Acknowledgement
 *
 * Listing a thread marks the listed messages addressed to the caller as
 * read. The update is bounded by the highest sequence number that was
 * returned, so a message stored between the read and the update stays
 * unread. The returned records show the flags as they were when read.
 */

use std::collections::HashMap;

use sqlx::SqlitePool;
use uuid::Uuid;

use super::db;
use crate::backend::auth::users::{resolve_user, resolve_users};
use crate::backend::error::BackendError;
use crate::shared::messaging::{validate_content, DirectMessage};

/// Store a new message from `sender_id` to `receiver_id`
///
/// Both users must exist and differ. The returned message carries both
/// display summaries.
pub async fn send_message(
    pool: &SqlitePool,
    sender_id: Uuid,
    receiver_id: Uuid,
    content: &str,
) -> Result<DirectMessage, BackendError> {
    validate_content(content)?;

    if sender_id == receiver_id {
        return Err(BackendError::validation(
            "receiverId",
            "Cannot send a message to yourself",
        ));
    }

    let sender = resolve_user(pool, sender_id)
        .await?
        .ok_or_else(|| BackendError::validation("senderId", "Sender does not exist"))?;
    let receiver = resolve_user(pool, receiver_id)
        .await?
        .ok_or_else(|| BackendError::validation("receiverId", "Receiver does not exist"))?;

    let message = DirectMessage::new(sender_id, receiver_id, content);
    db::insert_message(pool, &message).await?;

    tracing::info!(
        "Stored message {} from {} to {}",
        message.id,
        sender_id,
        receiver_id
    );

    Ok(message.with_participants(Some(sender), Some(receiver)))
}

/// List the thread between `user_id` and `other_id`, oldest first
///
/// Marks the listed messages addressed to `user_id` as read.
pub async fn list_thread(
    pool: &SqlitePool,
    user_id: Uuid,
    other_id: Uuid,
) -> Result<Vec<DirectMessage>, BackendError> {
    let summaries: HashMap<Uuid, _> = resolve_users(pool, &[user_id, other_id])
        .await?
        .into_iter()
        .map(|summary| (summary.id, summary))
        .collect();
    if !summaries.contains_key(&other_id) {
        return Err(BackendError::not_found("User not found"));
    }

    let rows = db::fetch_thread(pool, user_id, other_id).await?;

    let unread_up_to = rows
        .iter()
        .filter(|(_, message)| message.receiver_id == user_id && !message.read)
        .map(|(seq, _)| *seq)
        .max();

    if let Some(up_to_seq) = unread_up_to {
        let marked = db::mark_thread_read(pool, user_id, other_id, up_to_seq).await?;
        tracing::debug!(
            "Marked {} message(s) from {} to {} as read",
            marked,
            other_id,
            user_id
        );
    }

    Ok(rows
        .into_iter()
        .map(|(_, message)| {
            let sender = summaries.get(&message.sender_id).cloned();
            let receiver = summaries.get(&message.receiver_id).cloned();
            message.with_participants(sender, receiver)
        })
        .collect())
}

/// Whether `user_id` and `other_id` have exchanged any message
///
/// Fails with `NotFound` when `other_id` does not resolve.
pub async fn thread_exists(
    pool: &SqlitePool,
    user_id: Uuid,
    other_id: Uuid,
) -> Result<bool, BackendError> {
    if resolve_user(pool, other_id).await?.is_none() {
        return Err(BackendError::not_found("User not found"));
    }

    Ok(db::thread_exists(pool, user_id, other_id).await?)
}
