//! Sync endpoint routes.

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use todosync_engine::{ReconcileReport, Record, RecordStore};

use crate::error::{AppError, Result};
use crate::handlers::{handle_pull, handle_push};
use crate::AppState;

/// Query string of a push.
#[derive(Debug, Deserialize)]
pub struct PushQuery {
    /// Device whose complete record set the body is
    pub device: Option<String>,
}

/// Create sync routes.
pub fn routes<S: RecordStore + 'static>() -> Router<AppState<S>> {
    Router::new()
        .route("/sync", post(push_handler::<S>))
        .route("/pull", get(pull_handler::<S>))
}

/// POST /sync - Push a device's records to the server.
async fn push_handler<S: RecordStore + 'static>(
    State(state): State<AppState<S>>,
    Query(query): Query<PushQuery>,
    Json(entries): Json<Vec<serde_json::Value>>,
) -> Result<Json<ReconcileReport>> {
    let limit = state.config.max_push_records;
    if entries.len() > limit {
        return Err(AppError::BadRequest(format!(
            "push of {} records exceeds the limit of {}",
            entries.len(),
            limit
        )));
    }

    let device = query.device.as_deref();
    let _guard = state.push_locks.acquire(device).await;
    let report = handle_push(state.store.as_ref(), device, entries).await?;
    Ok(Json(report))
}

/// GET /pull - Download every device's records.
async fn pull_handler<S: RecordStore + 'static>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<Record>>> {
    let records = handle_pull(state.store.as_ref()).await?;
    Ok(Json(records))
}
