/**
 * Delivery Socket
 *
 * WebSocket endpoint at `GET /api/socket`.
 *
 * # Authentication
 *
 * The token is taken from the `token` query parameter, the
 * `Authorization: Bearer` header or the `token` cookie. Without one, the
 * first frame must be `{"event":"authenticate","data":{"token":"..."}}`.
 * An invalid token closes the socket after an `unauthorized` error frame.
 *
 * # Tasks
 *
 * After authentication the socket is split: a forwarding task drains the
 * connection's outbound queue into the sink while the handler task reads
 * inbound frames and drives the `Connection` state machine.
 */

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::HeaderMap,
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::connection::Connection;
use crate::backend::middleware::auth::{authenticate_token, token_from_headers};
use crate::backend::server::state::AppState;
use crate::shared::event::{ChannelErrorCode, ClientEvent, ServerEvent};

#[derive(Debug, Default, Deserialize)]
pub struct SocketParams {
    pub token: Option<String>,
}

/// Upgrade handler for `GET /api/socket`
pub async fn handle_socket_upgrade(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(params): Query<SocketParams>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let token = params.token.or_else(|| token_from_headers(&headers));
    ws.on_upgrade(move |socket| handle_socket(socket, state, token))
}

async fn handle_socket(mut socket: WebSocket, state: AppState, token: Option<String>) {
    let Some(user_id) = authenticate(&mut socket, &state, token).await else {
        return;
    };

    let (tx, mut rx) = mpsc::unbounded_channel::<ServerEvent>();
    let mut connection = Connection::new(user_id, tx, state.rooms.clone());
    tracing::info!("Socket connected for user {} (connection {})", user_id, connection.id());

    let (mut sender, mut receiver) = socket.split();

    let forward_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let text = match event.to_json() {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!("Failed to encode socket event: {}", e);
                    continue;
                }
            };
            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    connection.send(ServerEvent::authenticated(user_id));

    while let Some(frame) = receiver.next().await {
        let message = match frame {
            Ok(message) => message,
            Err(e) => {
                tracing::debug!("Socket error for connection {}: {}", connection.id(), e);
                break;
            }
        };

        match message {
            Message::Text(text) => match ClientEvent::from_json(text.as_str()) {
                Ok(event) => connection.handle(event),
                Err(e) => {
                    tracing::debug!("Unparseable frame on connection {}: {}", connection.id(), e);
                    connection.send(ServerEvent::error(
                        ChannelErrorCode::BadRequest,
                        format!("Invalid frame: {}", e),
                    ));
                }
            },
            Message::Close(_) => break,
            // binary frames are ignored; pings are answered by axum
            _ => {}
        }
    }

    connection.disconnect();
    // last sender goes away with the connection, which ends the forwarding task
    drop(connection);
    let _ = forward_task.await;
}

/// Resolve the socket's user, reading an `authenticate` frame if needed
async fn authenticate(
    socket: &mut WebSocket,
    state: &AppState,
    token: Option<String>,
) -> Option<Uuid> {
    let token = match token {
        Some(token) => token,
        None => read_authenticate_frame(socket).await?,
    };

    match authenticate_token(&state.db_pool, &state.sessions, &token).await {
        Ok(user) => Some(user.user_id),
        Err(e) => {
            tracing::warn!("Socket authentication failed: {}", e);
            reject(socket, ChannelErrorCode::Unauthorized, "Invalid or expired token").await;
            None
        }
    }
}

async fn read_authenticate_frame(socket: &mut WebSocket) -> Option<String> {
    while let Some(Ok(message)) = socket.recv().await {
        match message {
            Message::Text(text) => {
                return match ClientEvent::from_json(text.as_str()) {
                    Ok(ClientEvent::Authenticate { token }) => Some(token),
                    _ => {
                        reject(socket, ChannelErrorCode::Unauthorized, "Authenticate first").await;
                        None
                    }
                };
            }
            Message::Close(_) => return None,
            _ => continue,
        }
    }
    None
}

async fn reject(socket: &mut WebSocket, code: ChannelErrorCode, message: &str) {
    if let Ok(text) = ServerEvent::error(code, message).to_json() {
        let _ = socket.send(Message::Text(text.into())).await;
    }
    let _ = socket.send(Message::Close(None)).await;
}
