//! HTTP route handlers: health, entries, process, reply.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use checkin_core::ProcessOptions;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::error::ApiError;
use super::json_error;
use super::multipart::read_upload_form;
use super::state::AppState;

/// Body of `POST /v1/entries/{id}/reply`.
#[derive(Debug, Default, Deserialize)]
struct ReplyRequest {
    #[serde(default)]
    text: Option<String>,
}

/// Parse an optional JSON body. An empty body means "all defaults".
fn parse_json_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("invalid JSON body: {}", e)))
}

/// Fallback handler for unmatched routes.
pub(crate) async fn handle_not_found() -> impl IntoResponse {
    json_error(StatusCode::NOT_FOUND, "not found")
}

/// GET /health
pub(crate) async fn handle_health() -> impl IntoResponse {
    let response = serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    });
    (StatusCode::OK, Json(response))
}

/// GET /v1/entries
pub(crate) async fn handle_list_entries(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let entries = state.service.list().await?;
    Ok(Json(serde_json::json!({ "entries": entries })))
}

/// POST /v1/entries
pub(crate) async fn handle_create_entry(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let multipart = multipart.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let form = read_upload_form(multipart).await?;
    let created = state.service.create(form.audio, form.demo_mode).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /v1/entries/{id}
pub(crate) async fn handle_get_entry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = state.service.get(&id).await?;
    Ok(Json(entry))
}

/// POST /v1/entries/{id}/process
pub(crate) async fn handle_process_entry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let options: ProcessOptions = parse_json_body(&body)?;
    let processed = state.service.process(&id, options.demo_mode()).await?;
    Ok(Json(processed))
}

/// POST /v1/entries/{id}/reply
pub(crate) async fn handle_reply_entry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let request: ReplyRequest = parse_json_body(&body)?;
    let replied = state
        .service
        .reply(&id, request.text.as_deref().unwrap_or(""))
        .await?;
    Ok(Json(replied))
}
