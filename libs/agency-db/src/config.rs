use std::time::Duration;

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use serde::{Deserialize, Serialize};

use crate::error::DbError;

/// Database connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub sqlx_logging: bool,
    pub run_migrations: bool,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://agency.db?mode=rwc".to_owned(),
            max_connections: 10,
            min_connections: 1,
            acquire_timeout_secs: 5,
            sqlx_logging: false,
            run_migrations: true,
        }
    }
}

impl DbConfig {
    /// In-memory SQLite: every pooled connection would be its own database.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_owned(),
            max_connections: 1,
            min_connections: 1,
            ..Self::default()
        }
    }

    fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }
}

/// Handle to the connection pool, constructed once and injected into services.
///
/// Every statement checks a connection out of the pool and returns it when
/// the statement's future completes or is dropped.
#[derive(Clone, Debug)]
pub struct Db {
    conn: DatabaseConnection,
}

impl Db {
    #[must_use]
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    #[inline]
    #[must_use]
    pub fn conn(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Closes the pool.
    ///
    /// # Errors
    ///
    /// Returns the driver error if closing fails.
    pub async fn close(self) -> Result<(), DbError> {
        self.conn.close().await.map_err(DbError::from)
    }
}

/// Opens the pool described by `cfg`.
///
/// # Errors
///
/// Returns [`DbError::Config`] for an empty URL or inconsistent pool bounds
/// and the driver error if the connection cannot be established.
pub async fn connect_db(cfg: &DbConfig) -> Result<Db, DbError> {
    if cfg.url.trim().is_empty() {
        return Err(DbError::Config("database url is empty".to_owned()));
    }
    if cfg.min_connections > cfg.max_connections {
        return Err(DbError::Config(format!(
            "min_connections ({}) exceeds max_connections ({})",
            cfg.min_connections, cfg.max_connections
        )));
    }

    let (max, min) = if cfg.is_in_memory() {
        (1, 1)
    } else {
        (cfg.max_connections.max(1), cfg.min_connections)
    };

    let mut opts = ConnectOptions::new(cfg.url.clone());
    opts.max_connections(max)
        .min_connections(min)
        .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
        .sqlx_logging(cfg.sqlx_logging);

    tracing::debug!(max_connections = max, min_connections = min, "Connecting to database");
    let conn = Database::connect(opts).await?;
    tracing::info!(backend = ?conn.get_database_backend(), "Database connected");
    Ok(Db::new(conn))
}
