//! Contact CRUD, with the optional `?clusterId=` list filter.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::Value;

use portico_core::{validate, Contact};

use super::{json_body, path_id};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/contacts", get(list_contacts).post(create_contact))
        .route(
            "/contacts/{id}",
            get(get_contact).patch(update_contact).delete(delete_contact),
        )
}

#[derive(Debug, Deserialize)]
struct ContactQuery {
    #[serde(rename = "clusterId")]
    cluster_id: Option<String>,
}

/// GET /api/contacts[?clusterId=N]
async fn list_contacts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ContactQuery>,
) -> ApiResult<Json<Vec<Contact>>> {
    // An empty `?clusterId=` means no filter.
    match query.cluster_id.as_deref().map(str::trim) {
        None | Some("") => Ok(Json(state.store.contacts())),
        Some(raw) => {
            let cluster_id: i64 = raw
                .parse()
                .map_err(|_| ApiError::bad_request(format!("Invalid clusterId: {raw}")))?;
            Ok(Json(state.store.contacts_by_cluster(cluster_id)))
        }
    }
}

/// GET /api/contacts/{id}
async fn get_contact(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Contact>> {
    let id = path_id(&id, "Contact")?;
    state
        .store
        .contact(id)
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Contact"))
}

/// POST /api/contacts: the referenced cluster must exist.
async fn create_contact(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Contact>)> {
    let body = json_body(body)?;
    let input = validate::new_contact(&body).map_err(|e| ApiError::from_core(e, "create contact"))?;
    let contact = state
        .store
        .try_create_contact(input)
        .map_err(|e| ApiError::from_core(e, "create contact"))?;
    Ok((StatusCode::CREATED, Json(contact)))
}

/// PATCH /api/contacts/{id}
async fn update_contact(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Contact>> {
    let id = path_id(&id, "Contact")?;
    let body = json_body(body)?;
    let patch =
        validate::contact_patch(&body).map_err(|e| ApiError::from_core(e, "update contact"))?;
    state
        .store
        .try_update_contact(id, patch)
        .map(Json)
        .map_err(|e| ApiError::from_core(e, "update contact"))
}

/// DELETE /api/contacts/{id}
async fn delete_contact(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = path_id(&id, "Contact")?;
    if state.store.delete_contact(id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Contact"))
    }
}
