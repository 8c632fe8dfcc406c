/**
 * Login Handler
 *
 * `POST /api/auth/login`
 *
 * Verifies the password with bcrypt and returns a session token, both in
 * the body and as an HttpOnly `token` cookie. Unknown users and wrong
 * passwords get the same 401.
 */

use axum::{
    extract::State,
    http::header::SET_COOKIE,
    response::{IntoResponse, Json},
};
use bcrypt::verify;

use crate::backend::auth::handlers::types::{AuthResponse, LoginRequest};
use crate::backend::auth::users::{get_user_by_email, get_user_by_username};
use crate::backend::error::BackendError;
use crate::backend::middleware::auth::TOKEN_COOKIE;
use crate::backend::server::state::AppState;

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, BackendError> {
    let login = request.email.trim();
    tracing::info!("Login request for: {}", login);

    let user = if login.contains('@') {
        get_user_by_email(&state.db_pool, login).await?
    } else {
        get_user_by_username(&state.db_pool, login).await?
    };

    let user = user.ok_or_else(|| {
        tracing::warn!("User not found: {}", login);
        BackendError::NotAuthenticated
    })?;

    if !verify(&request.password, &user.password_hash)? {
        tracing::warn!("Invalid password for user: {}", user.username);
        return Err(BackendError::NotAuthenticated);
    }

    let token = state.sessions.create_token(user.id, &user.email)?;
    let cookie = session_cookie(&token, state.sessions.ttl().as_secs());

    tracing::info!("User logged in successfully: {} ({})", user.username, user.id);

    Ok((
        [(SET_COOKIE, cookie)],
        Json(AuthResponse {
            token,
            user: user.into(),
        }),
    ))
}

fn session_cookie(token: &str, max_age_secs: u64) -> String {
    format!(
        "{}={}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
        TOKEN_COOKIE, token, max_age_secs
    )
}
