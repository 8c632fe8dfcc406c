/**
 * Server Configuration
 *
 * Loads the server configuration and opens the database.
 *
 * # Configuration Sources
 *
 * Later sources override earlier ones:
 *
 * 1. Built-in defaults suitable for local development
 * 2. A TOML file: the path in `COMMUNE_CONFIG`, else `commune.toml` in the
 *    working directory when it exists
 * 3. Environment variables: `DATABASE_URL`, `JWT_SECRET`, `BIND_ADDR`,
 *    `SERVER_PORT`, `TOKEN_TTL_SECS`, `DATABASE_MAX_CONNECTIONS`
 *
 * # Example File
 *
 * ```toml
 * bind_addr = "127.0.0.1:8080"
 * database_url = "sqlite://data/commune.db"
 * max_connections = 10
 * token_ttl_secs = 86400
 * ```
 */

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://commune.db";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
/// Sessions last 7 days
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 7 * 24 * 60 * 60;
/// Closed room handles are swept every 5 minutes
pub const DEFAULT_ROOM_CLEANUP_INTERVAL_SECS: u64 = 300;
const DEVELOPMENT_JWT_SECRET: &str = "commune-development-secret-change-me";
const DEFAULT_CONFIG_FILE: &str = "commune.toml";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Resolved server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub database_url: String,
    pub max_connections: u32,
    pub jwt_secret: String,
    pub token_ttl_secs: u64,
    pub room_cleanup_interval_secs: u64,
}

impl ServerConfig {
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Load from the config file (if any) and the process environment
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Self::builder();

        let path = std::env::var("COMMUNE_CONFIG").ok().map(PathBuf::from);
        match path {
            Some(path) => builder = builder.merge_file(&path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    builder = builder.merge_file(default_path)?;
                }
            }
        }

        builder
            .merge_env(|key| std::env::var(key).ok())?
            .build()
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }

    pub fn room_cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.room_cleanup_interval_secs)
    }

    fn is_in_memory(&self) -> bool {
        self.database_url.contains(":memory:") || self.database_url.contains("mode=memory")
    }
}

/// Shape of the TOML config file; every key is optional
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub bind_addr: Option<String>,
    pub database_url: Option<String>,
    pub max_connections: Option<u32>,
    pub jwt_secret: Option<String>,
    pub token_ttl_secs: Option<u64>,
    pub room_cleanup_interval_secs: Option<u64>,
}

/// Builder for ServerConfig
#[derive(Debug, Default)]
pub struct ServerConfigBuilder {
    bind_addr: Option<String>,
    port: Option<u16>,
    database_url: Option<String>,
    max_connections: Option<u32>,
    jwt_secret: Option<String>,
    token_ttl_secs: Option<u64>,
    room_cleanup_interval_secs: Option<u64>,
}

impl ServerConfigBuilder {
    pub fn bind_addr(mut self, addr: impl Into<String>) -> Self {
        self.bind_addr = Some(addr.into());
        self
    }

    /// Replace only the port of the bind address
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = Some(max);
        self
    }

    pub fn jwt_secret(mut self, secret: impl Into<String>) -> Self {
        self.jwt_secret = Some(secret.into());
        self
    }

    pub fn token_ttl_secs(mut self, secs: u64) -> Self {
        self.token_ttl_secs = Some(secs);
        self
    }

    pub fn room_cleanup_interval_secs(mut self, secs: u64) -> Self {
        self.room_cleanup_interval_secs = Some(secs);
        self
    }

    /// Apply the values present in a parsed config file
    pub fn merge(mut self, file: FileConfig) -> Self {
        self.bind_addr = file.bind_addr.or(self.bind_addr);
        self.database_url = file.database_url.or(self.database_url);
        self.max_connections = file.max_connections.or(self.max_connections);
        self.jwt_secret = file.jwt_secret.or(self.jwt_secret);
        self.token_ttl_secs = file.token_ttl_secs.or(self.token_ttl_secs);
        self.room_cleanup_interval_secs = file
            .room_cleanup_interval_secs
            .or(self.room_cleanup_interval_secs);
        self
    }

    pub fn merge_toml(self, contents: &str) -> Result<Self, ConfigError> {
        let file: FileConfig = toml::from_str(contents)?;
        Ok(self.merge(file))
    }

    pub fn merge_file(self, path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!("Loading configuration from {}", path.display());
        self.merge_toml(&contents)
    }

    /// Apply environment overrides read through `lookup`
    pub fn merge_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL") {
            self.database_url = Some(url);
        }
        if let Some(secret) = lookup("JWT_SECRET") {
            self.jwt_secret = Some(secret);
        }
        if let Some(addr) = lookup("BIND_ADDR") {
            self.bind_addr = Some(addr);
        }
        if let Some(port) = lookup("SERVER_PORT") {
            self.port = Some(parse_value("SERVER_PORT", &port)?);
        }
        if let Some(ttl) = lookup("TOKEN_TTL_SECS") {
            self.token_ttl_secs = Some(parse_value("TOKEN_TTL_SECS", &ttl)?);
        }
        if let Some(max) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.max_connections = Some(parse_value("DATABASE_MAX_CONNECTIONS", &max)?);
        }
        Ok(self)
    }

    /// Build the configuration
    pub fn build(self) -> Result<ServerConfig, ConfigError> {
        let mut bind_addr = self
            .bind_addr
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        if let Some(port) = self.port {
            let host = bind_addr
                .rsplit_once(':')
                .map(|(host, _)| host.to_string())
                .unwrap_or_else(|| bind_addr.clone());
            bind_addr = format!("{}:{}", host, port);
        }

        let jwt_secret = match self.jwt_secret {
            Some(secret) if !secret.is_empty() => secret,
            Some(_) => {
                return Err(ConfigError::InvalidValue {
                    key: "jwt_secret",
                    value: String::new(),
                })
            }
            None => {
                tracing::warn!("JWT_SECRET not set, using the development secret");
                DEVELOPMENT_JWT_SECRET.to_string()
            }
        };

        let max_connections = self.max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS);
        if max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                key: "max_connections",
                value: "0".to_string(),
            });
        }

        let token_ttl_secs = self.token_ttl_secs.unwrap_or(DEFAULT_TOKEN_TTL_SECS);
        if token_ttl_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "token_ttl_secs",
                value: "0".to_string(),
            });
        }

        let room_cleanup_interval_secs = self
            .room_cleanup_interval_secs
            .unwrap_or(DEFAULT_ROOM_CLEANUP_INTERVAL_SECS);
        if room_cleanup_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "room_cleanup_interval_secs",
                value: "0".to_string(),
            });
        }

        Ok(ServerConfig {
            bind_addr,
            database_url: self
                .database_url
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            max_connections,
            jwt_secret,
            token_ttl_secs,
            room_cleanup_interval_secs,
        })
    }
}

fn parse_value<T: FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
    })
}

/// Open the SQLite pool and apply the embedded migrations
///
/// In-memory databases are pinned to a single connection that is never
/// recycled, otherwise each pooled connection would see its own empty
/// database.
pub async fn connect_database(config: &ServerConfig) -> Result<SqlitePool, sqlx::Error> {
    tracing::info!("Connecting to database...");

    let options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    let pool_options = if config.is_in_memory() {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(config.max_connections)
    };

    let pool = pool_options.connect_with(options).await?;
    tracing::info!("Database connection pool created successfully");

    tracing::info!("Running database migrations...");
    sqlx::migrate!().run(&pool).await?;
    tracing::info!("Database migrations completed successfully");

    Ok(pool)
}
