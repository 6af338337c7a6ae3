//! Health check endpoint.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use todosync_engine::RecordStore;

use crate::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub store: &'static str,
    pub version: &'static str,
}

/// Create health routes.
pub fn routes<S: RecordStore + 'static>() -> Router<AppState<S>> {
    Router::new()
        .route("/health", get(health_check::<S>))
        .route("/", get(root))
}

/// Health check handler. Answers 503 while the record store is unreachable.
async fn health_check<S: RecordStore + 'static>(
    State(state): State<AppState<S>>,
) -> (StatusCode, Json<HealthResponse>) {
    let (status, code, store) = match state.store.ping().await {
        Ok(()) => ("ok", StatusCode::OK, "ok"),
        Err(e) => {
            tracing::warn!("Store ping failed: {}", e);
            ("degraded", StatusCode::SERVICE_UNAVAILABLE, "unavailable")
        }
    };

    (
        code,
        Json(HealthResponse {
            status,
            store,
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}

/// Root handler.
async fn root() -> &'static str {
    "todosync server"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::locks::PushLocks;
    use std::sync::Arc;
    use todosync_engine::{Error, MemoryStore, Record, RecordId, Result};

    /// Store whose backend is gone.
    struct DownStore;

    impl RecordStore for DownStore {
        async fn list_all(&self) -> Result<Vec<Record>> {
            Err(Error::StorageUnavailable("down".into()))
        }

        async fn list_by_owner(&self, _owner: &str) -> Result<Vec<Record>> {
            Err(Error::StorageUnavailable("down".into()))
        }

        async fn get(&self, _id: RecordId, _owner: &str) -> Result<Option<Record>> {
            Err(Error::StorageUnavailable("down".into()))
        }

        async fn insert(&self, _record: &Record) -> Result<()> {
            Err(Error::StorageUnavailable("down".into()))
        }

        async fn update(&self, _id: RecordId, _owner: &str, _t: &str, _c: &str) -> Result<()> {
            Err(Error::StorageUnavailable("down".into()))
        }

        async fn delete(&self, _id: RecordId, _owner: &str) -> Result<()> {
            Err(Error::StorageUnavailable("down".into()))
        }

        async fn ping(&self) -> Result<()> {
            Err(Error::StorageUnavailable("down".into()))
        }
    }

    fn state<S>(store: S) -> AppState<S> {
        AppState {
            store: Arc::new(store),
            config: Arc::new(Config {
                host: "127.0.0.1".to_string(),
                port: 0,
                database_url: String::new(),
                max_push_records: 10,
            }),
            push_locks: Arc::new(PushLocks::new()),
        }
    }

    #[tokio::test]
    async fn healthy_store() {
        let (code, Json(body)) = health_check(State(state(MemoryStore::new()))).await;

        assert_eq!(code, StatusCode::OK);
        assert_eq!(body.status, "ok");
        assert_eq!(body.store, "ok");
    }

    #[tokio::test]
    async fn unreachable_store_is_unavailable() {
        let (code, Json(body)) = health_check(State(state(DownStore))).await;

        assert_eq!(code, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.status, "degraded");
        assert_eq!(body.store, "unavailable");
    }
}
