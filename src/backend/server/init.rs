/**
 * Server Initialization
 *
 * Builds the application from a `ServerConfig`:
 *
 * 1. Open the SQLite pool and run migrations
 * 2. Create the session keys and the room registry
 * 3. Assemble the router
 * 4. Start the periodic sweep of closed room handles
 */

use axum::Router;

use crate::backend::auth::sessions::SessionKeys;
use crate::backend::routes::router::create_router;
use crate::backend::server::config::{connect_database, ServerConfig};
use crate::backend::server::state::AppState;

/// Create and configure the Axum application
///
/// Fails only if the database cannot be opened or migrated.
pub async fn create_app(config: &ServerConfig) -> Result<Router<()>, sqlx::Error> {
    tracing::info!("Initializing Commune backend server");

    let db_pool = connect_database(config).await?;
    let sessions = SessionKeys::new(&config.jwt_secret, config.token_ttl());
    let app_state = AppState::new(db_pool, sessions);

    let app = create_router(app_state.clone());

    // ends on its own once the router and every socket are gone
    app_state.rooms.spawn_cleanup(config.room_cleanup_interval());
    tracing::info!("Router configured with periodic room cleanup");

    Ok(app)
}
