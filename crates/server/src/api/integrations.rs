//! Integration adapters and their credential sets.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::Value;

use luxpulse_store::{AdapterFilter, CredentialRotation, NewAdapter, NewCredentialSet};

use crate::state::AppState;

use super::{data, decode, decode_query, ApiError};

#[utoipa::path(
    post,
    path = "/api/v1/integrations/adapters",
    tag = "Integrations",
    request_body(content = Object, description = "`{tenantId, siteId, type, name, configJson}`"),
    responses(
        (status = 201, description = "Adapter registered", body = Object),
        (status = 400, description = "Invalid body", body = Object)
    )
)]
pub async fn register_adapter(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let input: NewAdapter = decode(body)?;
    let adapter = state.store.register_adapter(input)?;
    Ok((StatusCode::CREATED, data(adapter)))
}

#[utoipa::path(
    get,
    path = "/api/v1/integrations/adapters",
    tag = "Integrations",
    params(
        ("tenantId" = Option<String>, Query, description = "Only adapters of this tenant"),
        ("siteId" = Option<String>, Query, description = "Only adapters at this site")
    ),
    responses((status = 200, description = "Registered adapters", body = Object))
)]
pub async fn list_adapters(
    State(state): State<Arc<AppState>>,
    query: Result<Query<AdapterFilter>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = decode_query(query)?;
    Ok(data(state.store.list_adapters(&filter)))
}

#[utoipa::path(
    get,
    path = "/api/v1/integrations/adapters/{adapterId}/health",
    tag = "Integrations",
    params(("adapterId" = String, Path, description = "Adapter ID")),
    responses(
        (status = 200, description = "Heartbeat and error timestamps", body = Object),
        (status = 404, description = "Adapter not found", body = Object)
    )
)]
pub async fn adapter_health(
    State(state): State<Arc<AppState>>,
    Path(adapter_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(data(state.store.adapter_health(&adapter_id)?))
}

#[utoipa::path(
    post,
    path = "/api/v1/integrations/credentials",
    tag = "Integrations",
    request_body(content = Object, description = "`{tenantId, siteId, adapterId, secretRef, rotatedBy}`"),
    responses(
        (status = 201, description = "Credential set stored", body = Object),
        (status = 400, description = "Invalid body", body = Object)
    )
)]
pub async fn create_credential_set(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let input: NewCredentialSet = decode(body)?;
    let credential_set = state.store.create_credential_set(input)?;
    Ok((StatusCode::CREATED, data(credential_set)))
}

#[utoipa::path(
    post,
    path = "/api/v1/integrations/credentials/{credentialSetId}/rotate",
    tag = "Integrations",
    params(("credentialSetId" = String, Path, description = "Credential set ID")),
    request_body(content = Object, description = "`{secretRef?, rotatedBy?}`"),
    responses(
        (status = 200, description = "Rotated credential set", body = Object),
        (status = 404, description = "Credential set not found", body = Object)
    )
)]
pub async fn rotate_credential_set(
    State(state): State<Arc<AppState>>,
    Path(credential_set_id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let rotation: CredentialRotation = decode(body)?;
    Ok(data(state.store.rotate_credential_set(&credential_set_id, rotation)?))
}
