//! todosync device side.
//!
//! Local SQLite persistence, the HTTP sync client and the todo service that
//! ties them to the engine's reconciler.

pub mod config;
pub mod remote;
pub mod service;
pub mod store;

pub use config::{ConfigError, DeviceConfig};
pub use remote::SyncClient;
pub use service::TodoService;
pub use store::SqliteStore;
