//! Database operations for direct messages
//!
//! Rows carry an internal `seq` that orders messages with equal timestamps
//! and bounds read acknowledgements. It never leaves this module's callers.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::backend::auth::users::from_micros;
use crate::shared::messaging::DirectMessage;

const MESSAGE_COLUMNS: &str = "seq, id, sender_id, receiver_id, content, is_read, created_at";

fn message_from_row(row: &SqliteRow) -> Result<(i64, DirectMessage), sqlx::Error> {
    let message = DirectMessage {
        id: row.try_get("id")?,
        sender_id: row.try_get("sender_id")?,
        receiver_id: row.try_get("receiver_id")?,
        content: row.try_get("content")?,
        created_at: from_micros(row.try_get("created_at")?),
        read: row.try_get("is_read")?,
        sender: None,
        receiver: None,
    };
    Ok((row.try_get("seq")?, message))
}

/// Persist a new message, returning its sequence number
pub async fn insert_message(pool: &SqlitePool, message: &DirectMessage) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO direct_messages (id, sender_id, receiver_id, content, is_read, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(message.id)
    .bind(message.sender_id)
    .bind(message.receiver_id)
    .bind(&message.content)
    .bind(message.read)
    .bind(message.created_at.timestamp_micros())
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// All messages between two users in either direction, oldest first
pub async fn fetch_thread(
    pool: &SqlitePool,
    user_a: Uuid,
    user_b: Uuid,
) -> Result<Vec<(i64, DirectMessage)>, sqlx::Error> {
    let rows = sqlx::query(&format!(
        r#"
        SELECT {MESSAGE_COLUMNS}
        FROM direct_messages
        WHERE (sender_id = ? AND receiver_id = ?)
           OR (sender_id = ? AND receiver_id = ?)
        ORDER BY created_at ASC, seq ASC
        "#
    ))
    .bind(user_a)
    .bind(user_b)
    .bind(user_b)
    .bind(user_a)
    .fetch_all(pool)
    .await?;

    rows.iter().map(message_from_row).collect()
}

/// Mark unread messages from `sender` to `reader` as read, up to `up_to_seq`
///
/// Returns the number of rows flipped.
pub async fn mark_thread_read(
    pool: &SqlitePool,
    reader: Uuid,
    sender: Uuid,
    up_to_seq: i64,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE direct_messages
        SET is_read = 1
        WHERE receiver_id = ? AND sender_id = ? AND is_read = 0 AND seq <= ?
        "#,
    )
    .bind(reader)
    .bind(sender)
    .bind(up_to_seq)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Every message the user sent or received with its `seq`, newest first
pub async fn fetch_messages_involving(
    pool: &SqlitePool,
    user_id: Uuid,
) -> Result<Vec<(i64, DirectMessage)>, sqlx::Error> {
    let rows = sqlx::query(&format!(
        r#"
        SELECT {MESSAGE_COLUMNS}
        FROM direct_messages
        WHERE sender_id = ? OR receiver_id = ?
        ORDER BY created_at DESC, seq DESC
        "#
    ))
    .bind(user_id)
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(message_from_row).collect()
}

/// Whether any message exists between the pair, in either direction
pub async fn thread_exists(pool: &SqlitePool, user_a: Uuid, user_b: Uuid) -> Result<bool, sqlx::Error> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM (
            SELECT 1 FROM direct_messages
            WHERE (sender_id = ? AND receiver_id = ?)
               OR (sender_id = ? AND receiver_id = ?)
            LIMIT 1
        )
        "#,
    )
    .bind(user_a)
    .bind(user_b)
    .bind(user_b)
    .bind(user_a)
    .fetch_one(pool)
    .await?;

    Ok(count > 0)
}

/// Number of stored messages
pub async fn count_messages(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM direct_messages")
        .fetch_one(pool)
        .await
}
