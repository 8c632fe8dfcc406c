//! Database test fixtures
//!
//! Each `TestDatabase` is a fresh SQLite file in its own temporary
//! directory, removed when the fixture is dropped.

use commune::backend::server::config::connect_database;
use commune::backend::server::ServerConfig;
use sqlx::SqlitePool;
use tempfile::TempDir;

pub const TEST_JWT_SECRET: &str = "test-secret-for-integration-tests";

/// Test database fixture
pub struct TestDatabase {
    pool: SqlitePool,
    config: ServerConfig,
    _dir: TempDir,
}

impl TestDatabase {
    /// Create a new database and run the migrations
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("commune-test.db");

        let config = ServerConfig::builder()
            .bind_addr("127.0.0.1:0")
            .database_url(format!("sqlite://{}", path.display()))
            .jwt_secret(TEST_JWT_SECRET)
            .build()
            .expect("Failed to build test config");

        let pool = connect_database(&config)
            .await
            .expect("Failed to open test database");

        Self {
            pool,
            config,
            _dir: dir,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}
