/**
 * Signup Handler
 *
 * `POST /api/auth/signup`
 *
 * 1. Validate username, email and password
 * 2. Reject a username or email that is already registered (409)
 * 3. Hash the password with bcrypt and create the user
 * 4. Return a session token and the new user (201)
 */

use axum::{extract::State, http::StatusCode, response::Json};
use bcrypt::{hash, DEFAULT_COST};

use crate::backend::auth::handlers::types::{AuthResponse, SignupRequest};
use crate::backend::auth::users::{create_user, get_user_by_email, get_user_by_username};
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;

const MIN_PASSWORD_LEN: usize = 8;

/// Usernames are 3-30 characters, start with a letter, and contain only
/// letters, digits and underscores
pub fn is_valid_username(username: &str) -> bool {
    if username.len() < 3 || username.len() > 30 {
        return false;
    }

    let mut chars = username.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }

    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), BackendError> {
    let username = request.username.trim();
    let email = request.email.trim();
    tracing::info!("Signup request for username: {}", username);

    if !is_valid_username(username) {
        return Err(BackendError::validation(
            "username",
            "Username must be 3-30 chars, start with a letter, and contain only letters, numbers, and underscores",
        ));
    }
    if !email.contains('@') {
        return Err(BackendError::validation("email", "Invalid email format"));
    }
    if request.password.len() < MIN_PASSWORD_LEN {
        return Err(BackendError::validation(
            "password",
            "Password must be at least 8 characters",
        ));
    }

    if get_user_by_username(&state.db_pool, username).await?.is_some() {
        tracing::warn!("Username already exists: {}", username);
        return Err(BackendError::conflict("Username already taken"));
    }
    if get_user_by_email(&state.db_pool, email).await?.is_some() {
        tracing::warn!("Email already exists: {}", email);
        return Err(BackendError::conflict("Email already registered"));
    }

    let password_hash = hash(&request.password, DEFAULT_COST)?;

    let user = create_user(&state.db_pool, username, email, &password_hash)
        .await
        .map_err(|e| match e {
            // lost a race with a concurrent signup
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                BackendError::conflict("Username or email already registered")
            }
            other => other.into(),
        })?;

    let token = state.sessions.create_token(user.id, &user.email)?;
    tracing::info!("User created successfully: {} ({})", user.username, user.id);

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: user.into(),
        }),
    ))
}
