/**
 * Router Configuration
 *
 * Assembles the public routes, the authenticated API and the delivery
 * socket into one router, then adds tracing and CORS.
 */

use axum::{extract::State, http::StatusCode, routing::get, Router};
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::backend::realtime::handle_socket_upgrade;
use crate::backend::routes::api_routes::{configure_api_routes, configure_public_routes};
use crate::backend::server::state::AppState;

/// Create the Axum router with all routes configured
///
/// - `GET /health` - 200 when the store answers, 503 otherwise
/// - `GET /api/socket` - Delivery channel (authenticates itself)
/// - everything in `api_routes`
pub fn create_router(app_state: AppState) -> Router<()> {
    let router = Router::new()
        .route("/health", get(health_check))
        .route("/api/socket", get(handle_socket_upgrade));

    let router = configure_public_routes(router);
    let router = router.merge(configure_api_routes(&app_state));

    router
        .fallback(|| async { (StatusCode::NOT_FOUND, "404 Not Found") })
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

async fn health_check(State(pool): State<SqlitePool>) -> StatusCode {
    match pool.acquire().await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
