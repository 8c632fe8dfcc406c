//! Full conversation flow: signup, send, read, list, realtime delivery

use axum::http::StatusCode;
use axum_test::TestServer;
use commune::backend::auth::AuthResponse;
use commune::backend::server::{create_app, ServerConfig};
use commune::shared::event::{ClientEvent, ServerEvent};
use commune::shared::messaging::{DirectMessage, ListConversationsResponse, ListMessagesResponse};
use futures_util::{SinkExt, StreamExt};
use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::time::{timeout, Duration};
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::common::{create_test_user, session_keys, spawn_server, test_state, TestDatabase};

#[tokio::test]
async fn test_app_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = ServerConfig::builder()
        .database_url(format!("sqlite://{}", dir.path().join("app.db").display()))
        .jwt_secret("e2e-secret")
        .build()
        .unwrap();
    let server = TestServer::new(create_app(&config).await.unwrap()).unwrap();

    let mut tokens = Vec::new();
    for name in ["alice", "bob"] {
        let response = server
            .post("/api/auth/signup")
            .json(&json!({
                "username": name,
                "email": format!("{}@example.com", name),
                "password": "password123"
            }))
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
        tokens.push(response.json::<AuthResponse>());
    }
    let (alice, bob) = (&tokens[0], &tokens[1]);

    let sent: DirectMessage = server
        .post("/api/messages")
        .authorization_bearer(&alice.token)
        .json(&json!({ "receiverId": bob.user.id, "content": "hi" }))
        .await
        .json();

    let thread: ListMessagesResponse = server
        .get(&format!("/api/messages/{}", alice.user.id))
        .authorization_bearer(&bob.token)
        .await
        .json();
    assert_eq!(thread.messages.len(), 1);
    assert_eq!(thread.messages[0].id, sent.id);

    let conversations: ListConversationsResponse = server
        .get("/api/conversations")
        .authorization_bearer(&bob.token)
        .await
        .json();
    assert_eq!(conversations.conversations.len(), 1);
    assert_eq!(conversations.conversations[0].user.id, alice.user.id);
    assert_eq!(conversations.conversations[0].last_message.content, "hi");
    assert_eq!(conversations.conversations[0].unread_count, 0);

    server.get("/health").await.assert_status_ok();
}

#[tokio::test]
async fn test_send_read_and_deliver() {
    let db = TestDatabase::new().await;
    let keys = session_keys(&db);
    let alice = create_test_user(db.pool(), &keys, "alice").await;
    let bob = create_test_user(db.pool(), &keys, "bob").await;
    let state = test_state(&db);
    let server = TestServer::new(commune::backend::routes::create_router(state.clone())).unwrap();
    let addr = spawn_server(state).await;

    // A sends "hi"; B reads it
    server
        .post("/api/messages")
        .authorization_bearer(&alice.token)
        .json(&json!({ "receiverId": bob.id, "content": "hi" }))
        .await
        .assert_status(StatusCode::CREATED);

    let first: ListMessagesResponse = server
        .get(&format!("/api/messages/{}", alice.id))
        .authorization_bearer(&bob.token)
        .await
        .json();
    assert_eq!(first.messages[0].content, "hi");

    let second: ListMessagesResponse = server
        .get(&format!("/api/messages/{}", alice.id))
        .authorization_bearer(&bob.token)
        .await
        .json();
    assert!(second.messages[0].read);

    let conversations: ListConversationsResponse = server
        .get("/api/conversations")
        .authorization_bearer(&bob.token)
        .await
        .json();
    assert_eq!(conversations.conversations[0].last_message.content, "hi");

    // B listens on a socket; A sends "yo" and republishes it
    let (mut bob_socket, _) = connect_async(format!("ws://{}/api/socket", addr))
        .await
        .unwrap();
    let frames = [
        ClientEvent::Authenticate {
            token: bob.token.clone(),
        },
        ClientEvent::Join(bob.id),
    ];
    for frame in &frames {
        bob_socket
            .send(Message::text(serde_json::to_string(frame).unwrap()))
            .await
            .unwrap();
    }

    let (mut alice_socket, _) =
        connect_async(format!("ws://{}/api/socket?token={}", addr, alice.token))
            .await
            .unwrap();

    let yo: DirectMessage = server
        .post("/api/messages")
        .authorization_bearer(&alice.token)
        .json(&json!({ "receiverId": bob.id, "content": "yo" }))
        .await
        .json();

    // wait for bob's join to be acknowledged before publishing
    let mut bob_events = Vec::new();
    while bob_events.len() < 2 {
        bob_events.push(read_event(&mut bob_socket).await);
    }
    assert_eq!(
        bob_events,
        vec![ServerEvent::authenticated(bob.id), ServerEvent::joined(bob.id)]
    );

    alice_socket
        .send(Message::text(
            serde_json::to_string(&ClientEvent::SendMessage(yo.clone())).unwrap(),
        ))
        .await
        .unwrap();

    match read_event(&mut bob_socket).await {
        ServerEvent::ReceiveMessage(message) => {
            assert_eq!(message.content, "yo");
            assert_eq!(message.sender_id, alice.id);
            assert_eq!(message.id, yo.id);
        }
        other => panic!("expected receive_message, got {:?}", other),
    }
}

async fn read_event<S>(socket: &mut S) -> ServerEvent
where
    S: futures_util::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    timeout(Duration::from_secs(2), async {
        loop {
            match socket.next().await {
                Some(Ok(Message::Text(text))) => {
                    return serde_json::from_str::<ServerEvent>(text.as_str()).unwrap()
                }
                Some(Ok(_)) => continue,
                other => panic!("socket ended: {:?}", other),
            }
        }
    })
    .await
    .expect("Timed out waiting for an event")
}
