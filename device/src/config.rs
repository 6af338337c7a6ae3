//! Configuration management for the device.

use std::env;
use todosync_engine::{derive_owner_id, DeviceMetadata, OwnerId};

/// Default local database.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://todos.db?mode=rwc";

/// Default sync server.
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";

/// Device configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// SQLite connection URL
    pub database_url: String,
    /// Base URL of the sync server
    pub server_url: String,
    /// Metadata the owner id is derived from
    pub metadata: DeviceMetadata,
}

impl DeviceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// The device name falls back to `HOSTNAME`. Either a device name or an
    /// OS build id is required; the other fields alone are shared by many
    /// machines.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url =
            lookup("TODOSYNC_DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let server_url =
            lookup("TODOSYNC_SERVER_URL").unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());

        let year_class = lookup("TODOSYNC_DEVICE_YEAR_CLASS")
            .map(|v| v.trim().parse().map_err(|_| ConfigError::InvalidYearClass(v)))
            .transpose()?;

        let present = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let metadata = DeviceMetadata {
            device_name: present("TODOSYNC_DEVICE_NAME").or_else(|| present("HOSTNAME")),
            year_class,
            os_name: present("TODOSYNC_OS_NAME"),
            os_build_id: present("TODOSYNC_OS_BUILD_ID"),
        };

        if metadata.device_name.is_none() && metadata.os_build_id.is_none() {
            return Err(ConfigError::MissingDeviceIdentity);
        }

        Ok(Self {
            database_url,
            server_url,
            metadata,
        })
    }

    /// The owner id for this device.
    pub fn owner_id(&self) -> Result<OwnerId, ConfigError> {
        derive_owner_id(&self.metadata).map_err(|_| ConfigError::MissingDeviceIdentity)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid TODOSYNC_DEVICE_YEAR_CLASS value: {0}")]
    InvalidYearClass(String),

    #[error("No device identity: set TODOSYNC_DEVICE_NAME or TODOSYNC_OS_BUILD_ID")]
    MissingDeviceIdentity,
}
