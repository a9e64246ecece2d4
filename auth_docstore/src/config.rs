//! Store configuration

use std::{env, fmt, str::FromStr};
use thiserror::Error;

const DEFAULT_TABLE_PREFIX: &str = "auth_";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    MissingVar(&'static str),

    #[error("Unsupported store type: {0}. Supported types are 'sqlite' and 'postgres'")]
    UnsupportedStoreType(String),

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Backend behind the document store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreType {
    Sqlite,
    Postgres,
}

impl FromStr for StoreType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sqlite" => Ok(Self::Sqlite),
            "postgres" => Ok(Self::Postgres),
            other => Err(ConfigError::UnsupportedStoreType(other.to_string())),
        }
    }
}

impl fmt::Display for StoreType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sqlite => f.write_str("sqlite"),
            Self::Postgres => f.write_str("postgres"),
        }
    }
}

/// Connection settings for [`DocumentStore::connect`](crate::DocumentStore::connect)
#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    pub store_type: StoreType,
    pub url: String,
    /// Prepended to every collection table name
    pub table_prefix: String,
    pub max_connections: u32,
}

impl StoreConfig {
    pub fn new(store_type: StoreType, url: impl Into<String>) -> Self {
        Self {
            store_type,
            url: url.into(),
            table_prefix: DEFAULT_TABLE_PREFIX.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }

    pub fn with_table_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.table_prefix = prefix.into();
        self
    }

    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    /// Read the configuration from the process environment
    ///
    /// - `GENERIC_DATA_STORE_TYPE`: `sqlite` or `postgres` (required)
    /// - `GENERIC_DATA_STORE_URL`: connection URL (required)
    /// - `DB_TABLE_PREFIX`: table name prefix, default `auth_`
    /// - `DB_MAX_CONNECTIONS`: pool size, default 5
    pub fn from_env() -> Result<Self, ConfigError> {
        let store_type = env::var("GENERIC_DATA_STORE_TYPE")
            .map_err(|_| ConfigError::MissingVar("GENERIC_DATA_STORE_TYPE"))?
            .parse::<StoreType>()?;
        let url = env::var("GENERIC_DATA_STORE_URL")
            .map_err(|_| ConfigError::MissingVar("GENERIC_DATA_STORE_URL"))?;

        let mut config = Self::new(store_type, url);

        if let Ok(prefix) = env::var("DB_TABLE_PREFIX") {
            config.table_prefix = prefix;
        }

        if let Ok(raw) = env::var("DB_MAX_CONNECTIONS") {
            config.max_connections = match raw.parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: "DB_MAX_CONNECTIONS",
                        value: raw,
                    });
                }
            };
        }

        Ok(config)
    }
}
