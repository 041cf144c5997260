//! `checkin serve` -- HTTP JSON API for voice check-in entries.
//!
//! Endpoints:
//! - GET  /health                     - Server status
//! - GET  /v1/entries                 - All entries, newest first
//! - POST /v1/entries                 - Upload audio (multipart `audio`, optional `demoMode`)
//! - GET  /v1/entries/{id}            - Full entry record
//! - POST /v1/entries/{id}/process    - Run (demo) analysis
//! - POST /v1/entries/{id}/reply      - Record a family reply
//!
//! All responses use Content-Type: application/json. Errors are
//! `{"error": "<message>"}` with the matching status code.

mod error;
mod handlers;
mod multipart;
mod state;

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use checkin_core::{EntryService, UploadDir};
use checkin_storage::JsonFileStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use self::handlers::{
    handle_create_entry, handle_get_entry, handle_health, handle_list_entries, handle_not_found,
    handle_process_entry, handle_reply_entry,
};
use self::state::AppState;

/// Where the server listens and keeps its files.
#[derive(Debug, Clone)]
pub(crate) struct ServeConfig {
    pub(crate) port: u16,
    pub(crate) data_file: PathBuf,
    pub(crate) upload_dir: PathBuf,
}

/// Construct a JSON error response with the given status code and message.
fn json_error(status: StatusCode, message: &str) -> impl IntoResponse {
    (status, Json(serde_json::json!({"error": message})))
}

fn router(state: Arc<AppState>) -> Router {
    // CORS: permissive so a local front-end can call the API directly.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route(
            "/v1/entries",
            get(handle_list_entries).post(handle_create_entry),
        )
        .route("/v1/entries/{id}", get(handle_get_entry))
        .route("/v1/entries/{id}/process", post(handle_process_entry))
        .route("/v1/entries/{id}/reply", post(handle_reply_entry))
        .fallback(handle_not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Audio uploads are not size-limited.
        .layer(DefaultBodyLimit::disable())
        .with_state(state)
}

/// Load the entry store and serve the API until Ctrl+C.
pub(crate) async fn start_server(config: ServeConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store = JsonFileStore::open(&config.data_file).await;
    tracing::info!(
        data_file = %store.path().display(),
        entries = store.len().await,
        "entry store loaded"
    );

    let service = EntryService::new(Arc::new(store), UploadDir::new(&config.upload_dir));
    tracing::info!(upload_dir = %service.uploads().path().display(), "storing uploads");
    let app = router(Arc::new(AppState { service }));

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("check-in server listening on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server shut down");
    Ok(())
}

/// Wait for a shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("received shutdown signal"),
        Err(e) => {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    }
}
