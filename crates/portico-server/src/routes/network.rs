//! The derived node/link projection the graph view renders.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use portico_core::{parse_cluster_node_id, parse_contact_node_id, NetworkData};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/network", get(get_network))
        .route("/network/{node_id}", get(get_network_node))
}

/// GET /api/network: recomputed from the store on every call.
async fn get_network(State(state): State<Arc<AppState>>) -> Json<NetworkData> {
    Json(state.store.network_data())
}

/// GET /api/network/{nodeId}: adjacency of one projection node plus the
/// entity behind it, for the detail drawers.
async fn get_network_node(
    State(state): State<Arc<AppState>>,
    Path(node_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let graph = state.store.graph();
    if !graph.contains(&node_id) {
        return Err(ApiError::not_found("Node"));
    }

    let mut body = json!({
        "id": node_id,
        "degree": graph.degree(&node_id),
        "neighbors": graph.neighbors(&node_id),
    });
    if let Some(cluster) = parse_cluster_node_id(&node_id).and_then(|id| state.store.cluster(id)) {
        body["cluster"] = json!(cluster);
    }
    if let Some(contact) = parse_contact_node_id(&node_id).and_then(|id| state.store.contact(id)) {
        body["contact"] = json!(contact);
    }
    Ok(Json(body))
}
