//! HTTP route handlers.
//!
//! # Endpoints
//!
//! ### `GET /health`
//! Server name and version.
//!
//! ### `GET /session`
//! The whole managed tree.
//!
//! ### `GET /session/*path`
//! The value at `path`, or `404` when nothing is stored there.
//!
//! ### `PUT /session/*path`
//! Store the JSON request body at `path`, creating intermediate objects.
//! Responds `409` when the path runs through a value that is not an object.
//!
//! ### `DELETE /session/*path`
//! Remove the value at `path`. Deleting an absent path succeeds.
//!
//! ### `DELETE /session`
//! Reset the managed tree to `{}`.
//!
//! Every mutating endpoint responds `500` when the document cannot be
//! saved, and the session is left as it was before the request.
//!
//! URL paths may separate segments with `/` or `.`, so
//! `/session/profile/name` and `/session/profile.name` are the same.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use serde_json::Value;
use session_core::{StorageError, StoreError};
use tracing::{debug, error};

use crate::AppState;

/// Create the Axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/session", get(full_session_handler).delete(clear_handler))
        .route(
            "/session/*path",
            get(get_handler).put(set_handler).delete(delete_handler),
        )
        .with_state(state)
}

/// Error response body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Errors returned by session handlers.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    Conflict(StoreError),
    Storage(StorageError),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Conflict(e)
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        ApiError::Storage(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(path) => (StatusCode::NOT_FOUND, format!("No value at {}", path)),
            ApiError::Conflict(e) => (StatusCode::CONFLICT, e.to_string()),
            ApiError::Storage(e) => {
                error!("Failed to persist session: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

/// Turn a URL wildcard capture into a dot-separated session path.
pub fn session_path(raw: &str) -> String {
    raw.trim_matches('/').replace('/', ".")
}

/// Handler for `/health`.
async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let state = state.read().await;
    Json(serde_json::json!({
        "status": "ok",
        "name": state.config.name,
        "version": state.config.version
    }))
}

async fn full_session_handler(State(state): State<AppState>) -> Json<Value> {
    let state = state.read().await;
    Json(state.store().snapshot())
}

async fn get_handler(
    Path(path): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    let path = session_path(&path);
    let state = state.read().await;

    match state.store().get(&path) {
        Some(value) => Ok(Json(value)),
        None => Err(ApiError::NotFound(path)),
    }
}

async fn set_handler(
    Path(path): Path<String>,
    State(state): State<AppState>,
    Json(value): Json<Value>,
) -> Result<StatusCode, ApiError> {
    let path = session_path(&path);
    let mut state = state.write().await;
    let previous = state.store().document();

    state.store_mut().set(&path, value)?;
    state.commit(previous).await?;
    debug!("PUT {}", path);
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_handler(
    Path(path): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let path = session_path(&path);
    let mut state = state.write().await;
    let previous = state.store().document();

    if state.store_mut().delete(&path).is_some() {
        state.commit(previous).await?;
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn clear_handler(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    let mut state = state.write().await;
    let previous = state.store().document();

    state.store_mut().clear();
    state.commit(previous).await?;
    Ok(StatusCode::NO_CONTENT)
}
