//! HTTP routes over a built [`Library`].
//!
//! - `GET /`             index message
//! - `GET /work/`        full catalog
//! - `GET /work/{id}`    one work, or 404
//! - `GET /text/{hash}`  plaintext of a volume, or 404
//! - `GET /status`       counts and build time

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use serde::Serialize;

use crate::error::CatalogError;
use crate::model::CanonicalId;
use crate::service::Library;

/// Application state shared across handlers
pub struct AppState {
    pub library: Arc<Library>,
    pub index_message: String,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/work", get(all_works))
        .route("/work/", get(all_works))
        .route("/work/{id}", get(work))
        .route("/text/{hash}", get(text))
        .route("/status", get(status))
        .with_state(state)
}

// ============================================================================
// HANDLERS
// ============================================================================

async fn index(State(state): State<Arc<AppState>>) -> String {
    state.index_message.clone()
}

async fn all_works(State(state): State<Arc<AppState>>) -> Response {
    pretty_json(state.library.get_all_works())
}

async fn work(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    // Non-numeric ids cannot name a work.
    let id: CanonicalId = match id.parse() {
        Ok(id) => id,
        Err(_) => return (StatusCode::NOT_FOUND, format!("Work not found: {id}")).into_response(),
    };

    match state.library.get_work(id) {
        Ok(record) => pretty_json(record),
        Err(e) => error_response(e),
    }
}

async fn text(State(state): State<Arc<AppState>>, Path(hash): Path<String>) -> Response {
    match state.library.get_text(&hash) {
        Ok(bytes) => (
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            bytes,
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

async fn status(State(state): State<Arc<AppState>>) -> Response {
    pretty_json(&state.library.status())
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn pretty_json<T: Serialize + ?Sized>(value: &T) -> Response {
    match serde_json::to_string_pretty(value) {
        Ok(body) => (
            [(header::CONTENT_TYPE, "application/json; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(e) => {
            log::error!("Failed to serialize response: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

fn error_response(e: CatalogError) -> Response {
    if e.is_not_found() {
        (StatusCode::NOT_FOUND, e.to_string()).into_response()
    } else {
        log::error!("Request failed: {}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
    }
}
