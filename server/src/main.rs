//! todosync Server - shared todo records for every device.
//!
//! Devices push their own records to `POST /sync` and download everyone's
//! records from `GET /pull`. A push replaces the pushing device's record set
//! using the engine's reconciler.

mod config;
mod db;
mod error;
mod handlers;
mod locks;
mod routes;

use crate::config::Config;
use crate::db::PgStore;
use crate::locks::PushLocks;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Application state shared across handlers.
pub struct AppState<S> {
    pub store: Arc<S>,
    pub config: Arc<Config>,
    pub push_locks: Arc<PushLocks>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            config: self.config.clone(),
            push_locks: self.push_locks.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "todosync_server=debug,todosync_engine=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    tracing::info!("Starting todosync server on {}:{}", config.host, config.port);

    // Connect to the database
    let store = PgStore::connect(&config.database_url).await?;

    // Run migrations
    tracing::info!("Running database migrations...");
    store.run_migrations().await?;

    // Build application state
    let state = AppState {
        store: Arc::new(store),
        config: Arc::new(config.clone()),
        push_locks: Arc::new(PushLocks::new()),
    };

    // Build router
    let app = Router::new()
        .merge(routes::create_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
