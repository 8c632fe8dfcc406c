//! Authentication API integration tests
//!
//! Signup, login, current user and user search.

use axum::http::{header::SET_COOKIE, StatusCode};
use commune::backend::auth::AuthResponse;
use commune::shared::messaging::SearchUsersResponse;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::{create_test_user, session_keys, test_server, test_state, TestDatabase, TEST_PASSWORD};

#[tokio::test]
async fn test_signup_success() {
    let db = TestDatabase::new().await;
    let server = test_server(test_state(&db));

    let response = server
        .post("/api/auth/signup")
        .json(&json!({
            "username": "alice",
            "email": "alice@example.com",
            "password": "password123"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body: AuthResponse = response.json();
    assert!(!body.token.is_empty());
    assert_eq!(body.user.username, "alice");
    assert_eq!(body.user.avatar_url, "/default-avatar.jpg");
}

#[tokio::test]
async fn test_signup_rejects_bad_input() {
    let db = TestDatabase::new().await;
    let server = test_server(test_state(&db));

    let cases = [
        json!({ "username": "1abc", "email": "a@example.com", "password": "password123" }),
        json!({ "username": "valid_name", "email": "not-an-email", "password": "password123" }),
        json!({ "username": "valid_name", "email": "a@example.com", "password": "short" }),
    ];

    for body in cases {
        let response = server.post("/api/auth/signup").json(&body).await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST, "{}", body);
    }
}

#[tokio::test]
async fn test_signup_duplicate_username() {
    let db = TestDatabase::new().await;
    let keys = session_keys(&db);
    let existing = create_test_user(db.pool(), &keys, "taken").await;
    let server = test_server(test_state(&db));

    let response = server
        .post("/api/auth/signup")
        .json(&json!({
            "username": existing.username,
            "email": "someone-else@example.com",
            "password": "password123"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_login_sets_cookie() {
    let db = TestDatabase::new().await;
    let keys = session_keys(&db);
    let user = create_test_user(db.pool(), &keys, "login").await;
    let server = test_server(test_state(&db));

    let response = server
        .post("/api/auth/login")
        .json(&json!({ "email": user.email, "password": TEST_PASSWORD }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let cookie = response
        .headers()
        .get(SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(cookie.starts_with("token="));
    assert!(cookie.contains("HttpOnly"));

    let body: AuthResponse = response.json();
    assert_eq!(body.user.id, user.id);
}

#[tokio::test]
async fn test_login_by_username() {
    let db = TestDatabase::new().await;
    let keys = session_keys(&db);
    let user = create_test_user(db.pool(), &keys, "byname").await;
    let server = test_server(test_state(&db));

    let response = server
        .post("/api/auth/login")
        .json(&json!({ "email": user.username, "password": TEST_PASSWORD }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_wrong_password() {
    let db = TestDatabase::new().await;
    let keys = session_keys(&db);
    let user = create_test_user(db.pool(), &keys, "wrongpw").await;
    let server = test_server(test_state(&db));

    let response = server
        .post("/api/auth/login")
        .json(&json!({ "email": user.email, "password": "not-the-password" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_requires_token() {
    let db = TestDatabase::new().await;
    let server = test_server(test_state(&db));

    let response = server.get("/api/auth/me").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let response = server
        .get("/api/auth/me")
        .authorization_bearer("not-a-jwt")
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_returns_user() {
    let db = TestDatabase::new().await;
    let keys = session_keys(&db);
    let user = create_test_user(db.pool(), &keys, "me").await;
    let server = test_server(test_state(&db));

    let response = server
        .get("/api/auth/me")
        .authorization_bearer(&user.token)
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["username"], json!(user.username));
    assert!(body.get("passwordHash").is_none());
}

#[tokio::test]
async fn test_token_for_deleted_user_is_rejected() {
    let db = TestDatabase::new().await;
    let keys = session_keys(&db);
    let user = create_test_user(db.pool(), &keys, "gone").await;
    commune::backend::auth::users::delete_user(db.pool(), user.id)
        .await
        .unwrap();
    let server = test_server(test_state(&db));

    let response = server
        .get("/api/conversations")
        .authorization_bearer(&user.token)
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_search_excludes_caller() {
    let db = TestDatabase::new().await;
    let keys = session_keys(&db);
    let me = create_test_user(db.pool(), &keys, "findme").await;
    let other = create_test_user(db.pool(), &keys, "findme").await;
    let _unrelated = create_test_user(db.pool(), &keys, "nobody").await;
    let server = test_server(test_state(&db));

    let response = server
        .get("/api/users/search")
        .add_query_param("q", "FINDME")
        .authorization_bearer(&me.token)
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: SearchUsersResponse = response.json();
    assert_eq!(body.users, vec![other.summary()]);
}

#[tokio::test]
async fn test_search_empty_query() {
    let db = TestDatabase::new().await;
    let keys = session_keys(&db);
    let me = create_test_user(db.pool(), &keys, "empty").await;
    let server = test_server(test_state(&db));

    let response = server
        .get("/api/users/search")
        .authorization_bearer(&me.token)
        .await;

    let body: SearchUsersResponse = response.json();
    assert!(body.users.is_empty());
}

#[tokio::test]
async fn test_health() {
    let db = TestDatabase::new().await;
    let server = test_server(test_state(&db));

    let response = server.get("/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);
}
