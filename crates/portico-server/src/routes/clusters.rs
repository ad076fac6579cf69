//! Cluster CRUD.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;

use portico_core::{validate, Cluster};

use super::{json_body, path_id};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/clusters", get(list_clusters).post(create_cluster))
        .route(
            "/clusters/{id}",
            get(get_cluster).patch(update_cluster).delete(delete_cluster),
        )
}

/// GET /api/clusters
async fn list_clusters(State(state): State<Arc<AppState>>) -> Json<Vec<Cluster>> {
    Json(state.store.clusters())
}

/// GET /api/clusters/{id}
async fn get_cluster(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Cluster>> {
    let id = path_id(&id, "Cluster")?;
    state
        .store
        .cluster(id)
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Cluster"))
}

/// POST /api/clusters
async fn create_cluster(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Cluster>)> {
    let body = json_body(body)?;
    let input = validate::new_cluster(&body).map_err(|e| ApiError::from_core(e, "create cluster"))?;
    let cluster = if state.config.unique_cluster_names {
        state
            .store
            .create_cluster_unique(input)
            .map_err(|e| ApiError::from_core(e, "create cluster"))?
    } else {
        state.store.create_cluster(input)
    };
    Ok((StatusCode::CREATED, Json(cluster)))
}

/// PATCH /api/clusters/{id}
async fn update_cluster(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Cluster>> {
    let id = path_id(&id, "Cluster")?;
    let body = json_body(body)?;
    let patch =
        validate::cluster_patch(&body).map_err(|e| ApiError::from_core(e, "update cluster"))?;
    if state.config.unique_cluster_names {
        state
            .store
            .rename_cluster_unique(id, patch)
            .map(Json)
            .map_err(|e| ApiError::from_core(e, "update cluster"))
    } else {
        state
            .store
            .update_cluster(id, patch)
            .map(Json)
            .ok_or_else(|| ApiError::not_found("Cluster"))
    }
}

/// DELETE /api/clusters/{id}: also removes the cluster's contacts and
/// every connection touching them.
async fn delete_cluster(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = path_id(&id, "Cluster")?;
    if state.store.delete_cluster(id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Cluster"))
    }
}
