//! HTTP route definitions for the Portico API.
//!
//! Every resource module exposes `routes()`; they are merged under `/api`.

pub mod clusters;
pub mod connections;
pub mod contacts;
pub mod network;
pub mod stats;

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::Json;
use axum::Router;
use serde_json::Value;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::{panic_response, ApiError, ApiResult};
use crate::state::AppState;

/// Build the complete API router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(clusters::routes())
        .merge(contacts::routes())
        .merge(connections::routes())
        .merge(network::routes())
        .merge(stats::routes())
}

/// Unwrap a JSON body, turning extractor rejections into 400 `{message}`.
pub(crate) fn json_body(body: Result<Json<Value>, JsonRejection>) -> ApiResult<Value> {
    let Json(value) = body?;
    Ok(value)
}

/// Numeric path id. Anything else can never name an entity, so it is a 404.
pub(crate) fn path_id(raw: &str, entity: &str) -> ApiResult<i64> {
    raw.parse().map_err(|_| ApiError::not_found(entity))
}
