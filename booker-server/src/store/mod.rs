//! SQLite persistence.
//!
//! One [`Store`] wraps the connection pool and hands out a small repository
//! per table. The schema lives in `migrations/` and is applied on connect.

mod accounts;
mod bookings;
mod buses;
mod error;
mod routes;
mod rows;

use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::info;

pub use accounts::{AccountFilter, AccountStore};
pub use bookings::BookingStore;
pub use buses::BusStore;
pub use error::StoreError;
pub use routes::RouteStore;

/// Default database location, created on first use.
const DEFAULT_DATABASE_URL: &str = "sqlite://booker.db?mode=rwc";

/// Default pool size.
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Configuration for the database connection.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// SQLite connection URL.
    pub database_url: String,

    /// Maximum pooled connections.
    pub max_connections: u32,
}

impl StoreConfig {
    /// Create a config for the given database URL.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }

    /// Set the pool size.
    pub fn with_max_connections(mut self, n: u32) -> Self {
        self.max_connections = n;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DATABASE_URL)
    }
}

/// Handle to the database.
///
/// Cheap to clone; clones share the pool.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Connect, creating the database file if needed, and apply migrations.
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(&config.database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;
        info!(url = %config.database_url, "connected to database");

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// A private in-memory database, for tests and demos.
    ///
    /// Every SQLite in-memory connection is its own database, so the pool is
    /// pinned to one connection that is never recycled.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Apply pending migrations.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Accounts of every kind.
    pub fn accounts(&self) -> AccountStore<'_> {
        AccountStore { pool: &self.pool }
    }

    /// Buses.
    pub fn buses(&self) -> BusStore<'_> {
        BusStore { pool: &self.pool }
    }

    /// Routes.
    pub fn routes(&self) -> RouteStore<'_> {
        RouteStore { pool: &self.pool }
    }

    /// Bookings.
    pub fn bookings(&self) -> BookingStore<'_> {
        BookingStore { pool: &self.pool }
    }

    /// Close every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests;
