/**
 * Application State Management
 *
 * `AppState` is the central state container shared by every handler. The
 * `FromRef` implementations let handlers extract just the piece they use,
 * e.g. `State(pool): State<SqlitePool>`.
 *
 * All fields are cheap to clone: the pool and the room registry are
 * reference counted internally.
 */

use axum::extract::FromRef;
use sqlx::SqlitePool;

use crate::backend::auth::sessions::SessionKeys;
use crate::backend::realtime::rooms::DeliveryRooms;

#[derive(Clone)]
pub struct AppState {
    /// Message store and user directory
    pub db_pool: SqlitePool,
    /// Live delivery rooms, keyed by user id
    pub rooms: DeliveryRooms,
    /// Token signing keys and lifetime
    pub sessions: SessionKeys,
}

impl AppState {
    pub fn new(db_pool: SqlitePool, sessions: SessionKeys) -> Self {
        Self {
            db_pool,
            rooms: DeliveryRooms::new(),
            sessions,
        }
    }
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.db_pool.clone()
    }
}

impl FromRef<AppState> for DeliveryRooms {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.rooms.clone()
    }
}

impl FromRef<AppState> for SessionKeys {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.sessions.clone()
    }
}
