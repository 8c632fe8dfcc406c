//! Messaging API integration tests
//!
//! Sending, listing threads, the conversation list and the
//! start-conversation check, all through the HTTP router.

use axum::http::StatusCode;
use commune::shared::messaging::{
    DirectMessage, ListConversationsResponse, ListMessagesResponse, StartConversationResponse,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use uuid::Uuid;

use crate::common::{create_test_user, session_keys, test_server, test_state, TestDatabase};

#[tokio::test]
async fn test_messaging_requires_authentication() {
    let db = TestDatabase::new().await;
    let server = test_server(test_state(&db));
    let someone = Uuid::new_v4();

    let send = server
        .post("/api/messages")
        .json(&json!({ "receiverId": someone, "content": "hi" }))
        .await;
    let list = server.get(&format!("/api/messages/{}", someone)).await;
    let conversations = server.get("/api/conversations").await;

    assert_eq!(send.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(list.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(conversations.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_send_then_list_thread() {
    let db = TestDatabase::new().await;
    let keys = session_keys(&db);
    let alice = create_test_user(db.pool(), &keys, "alice").await;
    let bob = create_test_user(db.pool(), &keys, "bob").await;
    let server = test_server(test_state(&db));

    let response = server
        .post("/api/messages")
        .authorization_bearer(&alice.token)
        .json(&json!({ "receiverId": bob.id, "content": "hi" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let sent: DirectMessage = response.json();
    assert_eq!(sent.sender_id, alice.id);
    assert_eq!(sent.receiver_id, bob.id);
    assert_eq!(sent.content, "hi");
    assert!(!sent.read);
    assert_eq!(sent.sender, Some(alice.summary()));
    assert_eq!(sent.receiver, Some(bob.summary()));

    // bob reads: the snapshot still shows unread, the next read shows read
    let first: ListMessagesResponse = server
        .get(&format!("/api/messages/{}", alice.id))
        .authorization_bearer(&bob.token)
        .await
        .json();
    assert_eq!(first.messages.len(), 1);
    assert_eq!(first.messages[0].id, sent.id);
    assert!(!first.messages[0].read);

    let second: ListMessagesResponse = server
        .get(&format!("/api/messages/{}", alice.id))
        .authorization_bearer(&bob.token)
        .await
        .json();
    assert!(second.messages[0].read);
}

#[tokio::test]
async fn test_send_validation_errors() {
    let db = TestDatabase::new().await;
    let keys = session_keys(&db);
    let alice = create_test_user(db.pool(), &keys, "alice").await;
    let bob = create_test_user(db.pool(), &keys, "bob").await;
    let server = test_server(test_state(&db));

    let cases = [
        json!({ "receiverId": bob.id, "content": "" }),
        json!({ "receiverId": bob.id, "content": "   " }),
        json!({ "receiverId": "not-a-uuid", "content": "hi" }),
        json!({ "receiverId": Uuid::new_v4(), "content": "hi" }),
        json!({ "receiverId": alice.id, "content": "to myself" }),
    ];

    for body in cases {
        let response = server
            .post("/api/messages")
            .authorization_bearer(&alice.token)
            .json(&body)
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST, "{}", body);
        let error: serde_json::Value = response.json();
        assert!(error["error"].is_string());
    }
}

#[tokio::test]
async fn test_send_malformed_body() {
    let db = TestDatabase::new().await;
    let keys = session_keys(&db);
    let alice = create_test_user(db.pool(), &keys, "alice").await;
    let server = test_server(test_state(&db));

    let response = server
        .post("/api/messages")
        .authorization_bearer(&alice.token)
        .text("{\"receiverId\":")
        .content_type("application/json")
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_thread_unknown_user() {
    let db = TestDatabase::new().await;
    let keys = session_keys(&db);
    let alice = create_test_user(db.pool(), &keys, "alice").await;
    let server = test_server(test_state(&db));

    let missing = server
        .get(&format!("/api/messages/{}", Uuid::new_v4()))
        .authorization_bearer(&alice.token)
        .await;
    let malformed = server
        .get("/api/messages/not-a-uuid")
        .authorization_bearer(&alice.token)
        .await;

    assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(malformed.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_conversation_list() {
    let db = TestDatabase::new().await;
    let keys = session_keys(&db);
    let alice = create_test_user(db.pool(), &keys, "alice").await;
    let bob = create_test_user(db.pool(), &keys, "bob").await;
    let carol = create_test_user(db.pool(), &keys, "carol").await;
    let server = test_server(test_state(&db));

    for (from, to, content) in [
        (&bob, &alice, "from bob"),
        (&carol, &alice, "from carol"),
        (&alice, &bob, "reply to bob"),
    ] {
        server
            .post("/api/messages")
            .authorization_bearer(&from.token)
            .json(&json!({ "receiverId": to.id, "content": content }))
            .await
            .assert_status(StatusCode::CREATED);
    }

    let body: ListConversationsResponse = server
        .get("/api/conversations")
        .authorization_bearer(&alice.token)
        .await
        .json();

    let summary: Vec<(Uuid, String, u32)> = body
        .conversations
        .iter()
        .map(|c| (c.user.id, c.last_message.content.clone(), c.unread_count))
        .collect();
    assert_eq!(
        summary,
        vec![
            (bob.id, "reply to bob".to_string(), 1),
            (carol.id, "from carol".to_string(), 1),
        ]
    );
    assert_eq!(body.conversations[0].updated_at, body.conversations[0].last_message.created_at);
}

#[tokio::test]
async fn test_conversation_list_empty() {
    let db = TestDatabase::new().await;
    let keys = session_keys(&db);
    let alice = create_test_user(db.pool(), &keys, "alice").await;
    let server = test_server(test_state(&db));

    let body: serde_json::Value = server
        .get("/api/conversations")
        .authorization_bearer(&alice.token)
        .await
        .json();

    assert_eq!(body, json!({ "conversations": [] }));
}

#[tokio::test]
async fn test_start_conversation() {
    let db = TestDatabase::new().await;
    let keys = session_keys(&db);
    let alice = create_test_user(db.pool(), &keys, "alice").await;
    let bob = create_test_user(db.pool(), &keys, "bob").await;
    let server = test_server(test_state(&db));

    let before: StartConversationResponse = server
        .post("/api/conversations")
        .authorization_bearer(&alice.token)
        .json(&json!({ "receiverId": bob.id }))
        .await
        .json();
    assert!(before.success);
    assert!(!before.exists);

    server
        .post("/api/messages")
        .authorization_bearer(&bob.token)
        .json(&json!({ "receiverId": alice.id, "content": "hello" }))
        .await
        .assert_status(StatusCode::CREATED);

    let after: StartConversationResponse = server
        .post("/api/conversations")
        .authorization_bearer(&alice.token)
        .json(&json!({ "receiverId": bob.id }))
        .await
        .json();
    assert!(after.exists);

    let missing = server
        .post("/api/conversations")
        .authorization_bearer(&alice.token)
        .json(&json!({ "receiverId": Uuid::new_v4() }))
        .await;
    assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cookie_session() {
    let db = TestDatabase::new().await;
    let keys = session_keys(&db);
    let alice = create_test_user(db.pool(), &keys, "alice").await;
    let server = test_server(test_state(&db));

    let response = server
        .get("/api/conversations")
        .add_header(
            axum::http::header::COOKIE,
            axum::http::HeaderValue::from_str(&format!("token={}", alice.token)).unwrap(),
        )
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_store_outage_answers_generic_error() {
    let db = TestDatabase::new().await;
    let keys = session_keys(&db);
    let alice = create_test_user(db.pool(), &keys, "alice").await;
    let bob = create_test_user(db.pool(), &keys, "bob").await;
    let server = test_server(test_state(&db));

    db.pool().close().await;

    let health = server.get("/health").await;
    assert_eq!(health.status_code(), StatusCode::SERVICE_UNAVAILABLE);

    let send = server
        .post("/api/messages")
        .authorization_bearer(&alice.token)
        .json(&json!({ "receiverId": bob.id, "content": "hi" }))
        .await;
    assert_eq!(send.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = send.json();
    assert_eq!(body["error"], "Storage is temporarily unavailable");
    assert_eq!(body["status"], 500);

    let conversations = server
        .get("/api/conversations")
        .authorization_bearer(&alice.token)
        .await;
    assert_eq!(conversations.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
}
