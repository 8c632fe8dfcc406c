/**
 * User Search Handler
 *
 * `GET /api/users/search?q=...` returns up to ten users whose username
 * contains the query, ignoring case. The caller is left out of the
 * results. An empty query returns an empty list.
 */

use axum::{
    extract::{Query, State},
    response::Json,
};
use sqlx::SqlitePool;

use crate::backend::auth::handlers::types::SearchQuery;
use crate::backend::auth::users::search_users;
use crate::backend::error::BackendError;
use crate::backend::middleware::auth::AuthUser;
use crate::shared::messaging::SearchUsersResponse;

pub async fn search(
    State(pool): State<SqlitePool>,
    AuthUser(auth): AuthUser,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchUsersResponse>, BackendError> {
    let users = search_users(&pool, &query.q, Some(auth.user_id)).await?;
    Ok(Json(SearchUsersResponse { users }))
}
