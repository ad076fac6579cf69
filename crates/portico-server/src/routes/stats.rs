//! Store statistics and liveness.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde_json::json;

use portico_store::StoreStats;

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/stats", get(get_stats))
        .route("/health", get(health))
}

/// GET /api/stats
async fn get_stats(State(state): State<Arc<AppState>>) -> Json<StoreStats> {
    Json(state.store.stats())
}

/// GET /api/health
async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let now = Utc::now();
    Json(json!({
        "ok": true,
        "timestamp": now.to_rfc3339(),
        "uptimeSecs": (now - state.started_at).num_seconds(),
    }))
}
