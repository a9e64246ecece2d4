use sqlx::postgres::PgPoolOptions;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Postgres, Sqlite};
use std::str::FromStr;

use crate::config::{StoreConfig, StoreType};

use super::errors::StorageError;

// Types
#[derive(Clone, Debug)]
pub(crate) struct SqliteDataStore {
    pub(super) pool: sqlx::SqlitePool,
}

#[derive(Clone, Debug)]
pub(crate) struct PostgresDataStore {
    pub(super) pool: sqlx::PgPool,
}

// Trait
pub(crate) trait DataStore: Send + Sync {
    fn as_sqlite(&self) -> Option<&Pool<Sqlite>>;
    fn as_postgres(&self) -> Option<&Pool<Postgres>>;
}

// Store implementations
impl DataStore for SqliteDataStore {
    fn as_sqlite(&self) -> Option<&Pool<Sqlite>> {
        Some(&self.pool)
    }

    fn as_postgres(&self) -> Option<&Pool<Postgres>> {
        None
    }
}

impl DataStore for PostgresDataStore {
    fn as_sqlite(&self) -> Option<&Pool<Sqlite>> {
        None
    }

    fn as_postgres(&self) -> Option<&Pool<Postgres>> {
        Some(&self.pool)
    }
}

/// Open the connection pool described by `config`
pub(crate) async fn connect(config: &StoreConfig) -> Result<Box<dyn DataStore>, StorageError> {
    tracing::info!(
        store_type = %config.store_type,
        max_connections = config.max_connections,
        "Connecting to data store"
    );

    let store: Box<dyn DataStore> = match config.store_type {
        StoreType::Sqlite => {
            let opts = SqliteConnectOptions::from_str(&config.url)?.create_if_missing(true);
            let pool = SqlitePoolOptions::new()
                .max_connections(config.max_connections)
                .connect_with(opts)
                .await?;
            Box::new(SqliteDataStore { pool })
        }
        StoreType::Postgres => {
            let pool = PgPoolOptions::new()
                .max_connections(config.max_connections)
                .connect(&config.url)
                .await?;
            Box::new(PostgresDataStore { pool })
        }
    };

    tracing::info!(store_type = %config.store_type, "Connected to data store");

    Ok(store)
}
