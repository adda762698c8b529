use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::DbError;

// Relative to crates/orderfeed-db/Cargo.toml.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

/// Connection pool sizing. Defaults match the `ORDERFEED_DB_*` defaults in
/// `orderfeed_core::AppConfig`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 1,
            acquire_timeout_secs: 10,
        }
    }
}

impl PoolConfig {
    /// Reads `ORDERFEED_DB_*` from the process environment. Unset or
    /// unparsable values fall back to the defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        fn read<T: std::str::FromStr>(raw: Option<String>, default: T) -> T {
            raw.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
        }

        let defaults = Self::default();
        Self {
            max_connections: read(
                lookup("ORDERFEED_DB_MAX_CONNECTIONS"),
                defaults.max_connections,
            ),
            min_connections: read(
                lookup("ORDERFEED_DB_MIN_CONNECTIONS"),
                defaults.min_connections,
            ),
            acquire_timeout_secs: read(
                lookup("ORDERFEED_DB_ACQUIRE_TIMEOUT_SECS"),
                defaults.acquire_timeout_secs,
            ),
        }
    }

    #[must_use]
    pub fn from_app_config(config: &orderfeed_core::AppConfig) -> Self {
        Self {
            max_connections: config.db_max_connections,
            min_connections: config.db_min_connections,
            acquire_timeout_secs: config.db_acquire_timeout_secs,
        }
    }
}

/// Opens a pool against `database_url`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if no connection can be established within the
/// acquire timeout.
pub async fn connect_pool(database_url: &str, config: PoolConfig) -> Result<PgPool, DbError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections.min(config.max_connections))
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Like [`connect_pool`], with the URL and sizing taken from the environment.
///
/// # Errors
///
/// Returns [`DbError::MissingDatabaseUrl`] if `DATABASE_URL` is unset or
/// blank, or [`DbError::Sqlx`] if the connection fails.
pub async fn connect_pool_from_env() -> Result<PgPool, DbError> {
    let database_url = std::env::var("DATABASE_URL")
        .ok()
        .filter(|url| !url.trim().is_empty())
        .ok_or(DbError::MissingDatabaseUrl)?;
    connect_pool(&database_url, PoolConfig::from_env()).await
}

/// Applies pending migrations and returns how many were new.
///
/// # Errors
///
/// Returns [`DbError::Migration`] if a migration fails to apply.
pub async fn run_migrations(pool: &PgPool) -> Result<usize, DbError> {
    let before = applied_versions(pool).await;
    MIGRATOR.run(pool).await?;
    let after = applied_versions(pool).await;

    Ok(after.iter().filter(|v| !before.contains(v)).count())
}

/// Versions recorded as applied. Empty on a fresh database, where the
/// bookkeeping table does not exist yet.
async fn applied_versions(pool: &PgPool) -> Vec<i64> {
    sqlx::query_scalar::<_, i64>("SELECT version FROM _sqlx_migrations WHERE success")
        .fetch_all(pool)
        .await
        .unwrap_or_default()
}

/// Round-trips `SELECT 1`.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    let one: i32 = sqlx::query_scalar("SELECT 1").fetch_one(pool).await?;
    debug_assert_eq!(one, 1);
    Ok(())
}

/// [`ping`] with the error wrapped in [`DbError`].
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the database is unreachable.
pub async fn health_check(pool: &PgPool) -> Result<(), DbError> {
    ping(pool).await.map_err(DbError::from)
}
