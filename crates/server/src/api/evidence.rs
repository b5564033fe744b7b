//! Evidence packs.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::Value;
use tracing::info;

use luxpulse_store::NewEvidencePack;

use crate::state::AppState;

use super::{data, decode, ApiError};

#[utoipa::path(
    post,
    path = "/api/v1/evidence-packs",
    tag = "Evidence",
    request_body(content = Object, description = "`{tenantId, siteId, requestedBy, periodStart, periodEnd}`"),
    responses(
        (status = 202, description = "Pack accepted with its manifest", body = Object),
        (status = 400, description = "Invalid body", body = Object)
    )
)]
pub async fn create_evidence_pack(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let input: NewEvidencePack = decode(body)?;
    let pack = state.store.create_evidence_pack(input)?;
    info!(pack_id = %pack.id, site_id = %pack.site_id, "evidence pack created");
    Ok((StatusCode::ACCEPTED, data(pack)))
}

#[utoipa::path(
    get,
    path = "/api/v1/evidence-packs/{packId}",
    tag = "Evidence",
    params(("packId" = String, Path, description = "Evidence pack ID")),
    responses(
        (status = 200, description = "Evidence pack", body = Object),
        (status = 404, description = "Evidence pack not found", body = Object)
    )
)]
pub async fn get_evidence_pack(
    State(state): State<Arc<AppState>>,
    Path(pack_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(data(state.store.get_evidence_pack(&pack_id)?))
}

#[utoipa::path(
    get,
    path = "/api/v1/evidence-packs/{packId}/download",
    tag = "Evidence",
    params(("packId" = String, Path, description = "Evidence pack ID")),
    responses(
        (status = 200, description = "`{artifactRef, manifest}`", body = Object),
        (status = 404, description = "Evidence pack not found", body = Object)
    )
)]
pub async fn download_evidence_pack(
    State(state): State<Arc<AppState>>,
    Path(pack_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(data(state.store.evidence_download(&pack_id)?))
}
