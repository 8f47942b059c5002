//! Connection pool, schema and row mapping

use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::config::DatabaseConfig;
use crate::domain::{Class, Membership, Payload, Question, Role, Tag, User};
use crate::error::Result;
use crate::repository::{RepositoryError, RepositoryOperation, RepositoryResult};

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// SQLite pool shared by every repository
///
/// Cloning is cheap; clones share the pool. The schema is migrated when the
/// pool is opened.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open the pool described by `config` and bring the schema up to date
    ///
    /// # Errors
    ///
    /// Fails once every connection attempt has failed, or if a migration
    /// cannot be applied.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = create_pool(config).await?;
        MIGRATOR.run(&pool).await?;
        tracing::debug!(migrations = MIGRATOR.iter().count(), "schema up to date");
        Ok(Self { pool })
    }

    /// A fresh private database that lives as long as the returned pool
    ///
    /// # Errors
    ///
    /// Fails if SQLite cannot be opened or migrated.
    pub async fn in_memory() -> Result<Self> {
        Self::connect(&DatabaseConfig::default()).await
    }

    /// The underlying pool, for queries outside the repositories
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close every connection; later queries fail with a closed-pool error
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Create the pool, retrying with exponential backoff
async fn create_pool(config: &DatabaseConfig) -> Result<SqlitePool> {
    let mut attempt = 0;
    let base_delay = Duration::from_secs(config.retry_delay_secs);

    loop {
        match try_create_pool(config).await {
            Ok(pool) => {
                tracing::info!(
                    max = pool.options().get_max_connections(),
                    in_memory = config.is_in_memory(),
                    "Database connection pool created after {} attempt(s)",
                    attempt + 1
                );
                return Ok(pool);
            }
            Err(e) => {
                attempt += 1;
                if attempt > config.max_retries {
                    tracing::error!(
                        "Failed to open database after {} attempts: {}",
                        config.max_retries + 1,
                        e
                    );
                    return Err(e.into());
                }

                let delay = base_delay * 2_u32.pow(attempt.saturating_sub(1));
                tracing::warn!(
                    "Database connection attempt {} failed: {}. Retrying in {:?}...",
                    attempt,
                    e,
                    delay
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

async fn try_create_pool(config: &DatabaseConfig) -> std::result::Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .acquire_timeout(Duration::from_secs(config.connection_timeout_secs));
    // An in-memory database vanishes with its last connection; keep one alive
    let pool = if config.is_in_memory() {
        pool.max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        pool.max_connections(config.max_connections.max(1))
            .min_connections(config.min_connections)
    };
    pool.connect_with(options).await
}

fn parse<T>(table: &'static str, column: &str, raw: &str) -> RepositoryResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse().map_err(|err| {
        RepositoryError::serialization_error(
            RepositoryOperation::Query,
            format!("column {column} holds '{raw}': {err}"),
        )
        .with_entity(table, raw)
    })
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct TagRow {
    pub id: String,
    pub text: String,
}

impl TagRow {
    pub const COLUMNS: &'static str = "id, text";
}

impl TryFrom<TagRow> for Tag {
    type Error = RepositoryError;

    fn try_from(row: TagRow) -> RepositoryResult<Self> {
        Ok(Self {
            id: parse("tags", "id", &row.id)?,
            text: row.text,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct UserRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    pub const COLUMNS: &'static str = "id, name, email, role, created_at";
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> RepositoryResult<Self> {
        Ok(Self {
            id: parse("users", "id", &row.id)?,
            role: parse::<Role>("users", "role", &row.role)?,
            name: row.name,
            email: row.email,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ClassRow {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
}

impl ClassRow {
    pub const COLUMNS: &'static str = "id, name, description, owner_id, created_at";
}

impl TryFrom<ClassRow> for Class {
    type Error = RepositoryError;

    fn try_from(row: ClassRow) -> RepositoryResult<Self> {
        Ok(Self {
            id: parse("classes", "id", &row.id)?,
            owner_id: parse("classes", "owner_id", &row.owner_id)?,
            name: row.name,
            description: row.description,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct MembershipRow {
    pub class_id: String,
    pub user_id: String,
    pub joined_at: DateTime<Utc>,
}

impl MembershipRow {
    pub const COLUMNS: &'static str = "class_id, user_id, joined_at";
}

impl TryFrom<MembershipRow> for Membership {
    type Error = RepositoryError;

    fn try_from(row: MembershipRow) -> RepositoryResult<Self> {
        Ok(Self {
            class_id: parse("class_members", "class_id", &row.class_id)?,
            user_id: parse("class_members", "user_id", &row.user_id)?,
            joined_at: row.joined_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct QuestionRow {
    pub id: String,
    pub test_id: String,
    pub position: u32,
    pub body: String,
}

impl QuestionRow {
    pub const COLUMNS: &'static str = "id, test_id, position, body";
}

impl TryFrom<QuestionRow> for Question {
    type Error = RepositoryError;

    fn try_from(row: QuestionRow) -> RepositoryResult<Self> {
        Ok(Self {
            id: parse("questions", "id", &row.id)?,
            test_id: parse("questions", "test_id", &row.test_id)?,
            position: row.position,
            body: Payload::from_stored(row.body),
        })
    }
}
