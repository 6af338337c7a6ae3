//! Configuration management for the server.

use std::env;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// PostgreSQL connection URL
    pub database_url: String,
    /// Largest accepted push, in records
    pub max_push_records: usize,
}

/// Default cap on records in a single push.
pub const DEFAULT_MAX_PUSH_RECORDS: usize = 10_000;

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidPort)?;

        let database_url = env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)?;

        let max_push_records = match env::var("MAX_PUSH_RECORDS") {
            Ok(v) => v.parse().map_err(|_| ConfigError::InvalidMaxPushRecords)?,
            Err(_) => DEFAULT_MAX_PUSH_RECORDS,
        };

        Ok(Self {
            host,
            port,
            database_url,
            max_push_records,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("DATABASE_URL environment variable is required")]
    MissingDatabaseUrl,

    #[error("Invalid PORT value")]
    InvalidPort,

    #[error("Invalid MAX_PUSH_RECORDS value")]
    InvalidMaxPushRecords,
}
