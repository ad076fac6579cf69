//! Explicit connections between entities.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get};
use axum::{Json, Router};
use serde_json::Value;

use portico_core::{validate, Connection};

use super::{json_body, path_id};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/connections", get(list_connections).post(create_connection))
        .route("/connections/{id}", delete(delete_connection))
}

/// GET /api/connections
async fn list_connections(State(state): State<Arc<AppState>>) -> Json<Vec<Connection>> {
    Json(state.store.connections())
}

/// POST /api/connections
async fn create_connection(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Connection>)> {
    let body = json_body(body)?;
    let input = validate::new_connection(&body)
        .map_err(|e| ApiError::from_core(e, "create connection"))?;
    Ok((StatusCode::CREATED, Json(state.store.create_connection(input))))
}

/// DELETE /api/connections/{id}
async fn delete_connection(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = path_id(&id, "Connection")?;
    if state.store.delete_connection(id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Connection"))
    }
}
