/**
 * User Directory
 *
 * User records and the lookups the messaging core depends on. Timestamps
 * are stored as unix microseconds.
 */

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::shared::messaging::UserSummary;

/// Maximum number of users returned by a search
pub const SEARCH_LIMIT: i64 = 10;
pub const DEFAULT_AVATAR_URL: &str = "/default-avatar.jpg";

/// User struct representing a user in the database
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    /// Username (unique, 3-30 chars, alphanumeric + underscore)
    pub username: String,
    pub email: String,
    /// Hashed password (bcrypt)
    pub password_hash: String,
    pub avatar_url: String,
    pub bio: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            display_name: self.username.clone(),
            avatar_url: self.avatar_url.clone(),
        }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    avatar_url: String,
    bio: String,
    created_at: i64,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            avatar_url: row.avatar_url,
            bio: row.bio,
            created_at: from_micros(row.created_at),
        }
    }
}

#[derive(sqlx::FromRow)]
struct SummaryRow {
    id: Uuid,
    username: String,
    avatar_url: String,
}

impl From<SummaryRow> for UserSummary {
    fn from(row: SummaryRow) -> Self {
        Self {
            id: row.id,
            display_name: row.username,
            avatar_url: row.avatar_url,
        }
    }
}

/// Decode a stored microsecond timestamp
pub(crate) fn from_micros(micros: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_micros(micros).unwrap_or_default()
}

const USER_COLUMNS: &str = "id, username, email, password_hash, avatar_url, bio, created_at";

/// Create a new user
pub async fn create_user(
    pool: &SqlitePool,
    username: &str,
    email: &str,
    password_hash: &str,
) -> Result<User, sqlx::Error> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "INSERT INTO users (id, username, email, password_hash, created_at) \
         VALUES (?, ?, ?, ?, ?) \
         RETURNING {USER_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(Utc::now().timestamp_micros())
    .fetch_one(pool)
    .await?;

    Ok(row.into())
}

pub async fn get_user_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>, sqlx::Error> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(User::from))
}

pub async fn get_user_by_username(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<User>, sqlx::Error> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE username = ?"
    ))
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(User::from))
}

pub async fn get_user_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(User::from))
}

/// Resolve a user id to its display summary
pub async fn resolve_user(pool: &SqlitePool, id: Uuid) -> Result<Option<UserSummary>, sqlx::Error> {
    let row = sqlx::query_as::<_, SummaryRow>(
        "SELECT id, username, avatar_url FROM users WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(UserSummary::from))
}

/// Resolve many ids in one query; ids that do not resolve are absent
pub async fn resolve_users(
    pool: &SqlitePool,
    ids: &[Uuid],
) -> Result<Vec<UserSummary>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut query: QueryBuilder<Sqlite> =
        QueryBuilder::new("SELECT id, username, avatar_url FROM users WHERE id IN (");
    let mut separated = query.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");

    let rows = query.build_query_as::<SummaryRow>().fetch_all(pool).await?;
    Ok(rows.into_iter().map(UserSummary::from).collect())
}

/// Case-insensitive substring search on username
pub async fn search_users(
    pool: &SqlitePool,
    query: &str,
    exclude: Option<Uuid>,
) -> Result<Vec<UserSummary>, sqlx::Error> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }

    let rows = sqlx::query_as::<_, SummaryRow>(
        "SELECT id, username, avatar_url FROM users \
         WHERE instr(lower(username), lower(?)) > 0 AND (? IS NULL OR id != ?) \
         ORDER BY lower(username) \
         LIMIT ?",
    )
    .bind(query)
    .bind(exclude)
    .bind(exclude)
    .bind(SEARCH_LIMIT)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(UserSummary::from).collect())
}

/// Remove a user. Their messages stay in the store.
pub async fn delete_user(pool: &SqlitePool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
