//! Messaging HTTP Handlers
//!
//! Thin adapters between the JSON API and the message store. Every handler
//! runs behind `auth_middleware`, so the caller is always known.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use sqlx::SqlitePool;

use super::{conversations, store};
use crate::backend::error::BackendError;
use crate::backend::middleware::auth::AuthUser;
use crate::shared::messaging::{
    parse_user_id, DirectMessage, ListConversationsResponse, ListMessagesResponse,
    SendMessageRequest, StartConversationRequest, StartConversationResponse,
};

/// `POST /api/messages`
pub async fn send_message(
    State(pool): State<SqlitePool>,
    AuthUser(auth): AuthUser,
    payload: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<DirectMessage>), BackendError> {
    let Json(request) = payload?;
    let receiver_id = parse_user_id("receiverId", &request.receiver_id)?;

    let message = store::send_message(&pool, auth.user_id, receiver_id, &request.content).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// `GET /api/messages/{user_id}`
///
/// Acknowledges the listed messages addressed to the caller.
pub async fn list_messages(
    State(pool): State<SqlitePool>,
    AuthUser(auth): AuthUser,
    Path(user_id): Path<String>,
) -> Result<Json<ListMessagesResponse>, BackendError> {
    let other_id = parse_user_id("userId", &user_id)?;

    let messages = store::list_thread(&pool, auth.user_id, other_id).await?;
    Ok(Json(ListMessagesResponse { messages }))
}

/// `GET /api/conversations`
pub async fn list_conversations(
    State(pool): State<SqlitePool>,
    AuthUser(auth): AuthUser,
) -> Result<Json<ListConversationsResponse>, BackendError> {
    let conversations = conversations::list_conversations(&pool, auth.user_id).await?;
    Ok(Json(ListConversationsResponse { conversations }))
}

/// `POST /api/conversations`
///
/// Checks whether a thread with the receiver exists. Creates nothing.
pub async fn start_conversation(
    State(pool): State<SqlitePool>,
    AuthUser(auth): AuthUser,
    payload: Result<Json<StartConversationRequest>, JsonRejection>,
) -> Result<Json<StartConversationResponse>, BackendError> {
    let Json(request) = payload?;
    let receiver_id = parse_user_id("receiverId", &request.receiver_id)?;

    let exists = store::thread_exists(&pool, auth.user_id, receiver_id).await?;
    Ok(Json(StartConversationResponse {
        success: true,
        exists,
    }))
}
