//! HTTP route definitions.

mod health;
mod sync;

use crate::AppState;
use axum::Router;
use todosync_engine::RecordStore;

/// Create all application routes.
pub fn create_routes<S: RecordStore + 'static>() -> Router<AppState<S>> {
    Router::new()
        .merge(health::routes())
        .merge(sync::routes())
}
