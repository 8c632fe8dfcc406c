/**
 * API Routes
 *
 * # Public
 * - `POST /api/auth/signup` - User registration
 * - `POST /api/auth/login` - User login, sets the `token` cookie
 *
 * # Authenticated
 * - `GET /api/auth/me` - Current user
 * - `GET /api/users/search?q=` - Find users to message
 * - `POST /api/messages` - Send a message
 * - `GET /api/messages/{user_id}` - Thread with a user, acknowledging reads
 * - `GET /api/conversations` - Conversation list
 * - `POST /api/conversations` - Check for an existing thread
 */

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::backend::auth::{get_me, login, search, signup};
use crate::backend::messaging::handlers::{
    list_conversations, list_messages, send_message, start_conversation,
};
use crate::backend::middleware::auth::auth_middleware;
use crate::backend::server::state::AppState;

/// Routes that need no session
pub fn configure_public_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/login", post(login))
}

/// Routes behind `auth_middleware`
///
/// The middleware is applied with `route_layer`, so unknown paths still
/// answer 404 rather than 401.
pub fn configure_api_routes(app_state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/auth/me", get(get_me))
        .route("/api/users/search", get(search))
        .route("/api/messages", post(send_message))
        .route("/api/messages/{user_id}", get(list_messages))
        .route(
            "/api/conversations",
            get(list_conversations).post(start_conversation),
        )
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ))
}
