//! Tenants, sites, zones and assets.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::Value;

use luxpulse_store::{AssetFilter, AssetPatch, NewAsset, NewSite, NewTenant, NewZone};

use crate::state::AppState;

use super::{data, decode, decode_query, ApiError};

// ── Tenants ──────────────────────────────────────────────────────

#[utoipa::path(
    get,
    path = "/api/v1/tenants",
    tag = "Estate",
    responses((status = 200, description = "All tenants", body = Object))
)]
pub async fn list_tenants(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    data(state.store.list_tenants())
}

#[utoipa::path(
    post,
    path = "/api/v1/tenants",
    tag = "Estate",
    request_body(content = Object, description = "`{name}`"),
    responses(
        (status = 201, description = "Tenant created", body = Object),
        (status = 400, description = "Invalid body", body = Object)
    )
)]
pub async fn create_tenant(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let input: NewTenant = decode(body)?;
    let tenant = state.store.create_tenant(input)?;
    Ok((StatusCode::CREATED, data(tenant)))
}

// ── Sites ────────────────────────────────────────────────────────

#[utoipa::path(
    get,
    path = "/api/v1/tenants/{tenantId}/sites",
    tag = "Estate",
    params(("tenantId" = String, Path, description = "Tenant ID")),
    responses((status = 200, description = "Sites of the tenant", body = Object))
)]
pub async fn list_sites(
    State(state): State<Arc<AppState>>,
    Path(tenant_id): Path<String>,
) -> impl IntoResponse {
    data(state.store.list_sites(&tenant_id))
}

#[utoipa::path(
    post,
    path = "/api/v1/tenants/{tenantId}/sites",
    tag = "Estate",
    params(("tenantId" = String, Path, description = "Tenant ID")),
    request_body(content = Object, description = "`{name, timezone, latitude?, longitude?}`"),
    responses(
        (status = 201, description = "Site created", body = Object),
        (status = 400, description = "Invalid body", body = Object)
    )
)]
pub async fn create_site(
    State(state): State<Arc<AppState>>,
    Path(tenant_id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let input: NewSite = decode(body)?;
    let site = state.store.create_site(&tenant_id, input)?;
    Ok((StatusCode::CREATED, data(site)))
}

// ── Zones ────────────────────────────────────────────────────────

#[utoipa::path(
    get,
    path = "/api/v1/tenants/{tenantId}/sites/{siteId}/zones",
    tag = "Estate",
    params(
        ("tenantId" = String, Path, description = "Tenant ID"),
        ("siteId" = String, Path, description = "Site ID")
    ),
    responses((status = 200, description = "Zones of the site", body = Object))
)]
pub async fn list_zones(
    State(state): State<Arc<AppState>>,
    Path((tenant_id, site_id)): Path<(String, String)>,
) -> impl IntoResponse {
    data(state.store.list_zones(&tenant_id, &site_id))
}

#[utoipa::path(
    post,
    path = "/api/v1/tenants/{tenantId}/sites/{siteId}/zones",
    tag = "Estate",
    params(
        ("tenantId" = String, Path, description = "Tenant ID"),
        ("siteId" = String, Path, description = "Site ID")
    ),
    request_body(content = Object, description = "`{name, type}`"),
    responses(
        (status = 201, description = "Zone created", body = Object),
        (status = 400, description = "Invalid body", body = Object)
    )
)]
pub async fn create_zone(
    State(state): State<Arc<AppState>>,
    Path((tenant_id, site_id)): Path<(String, String)>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let input: NewZone = decode(body)?;
    let zone = state.store.create_zone(&tenant_id, &site_id, input)?;
    Ok((StatusCode::CREATED, data(zone)))
}

// ── Assets ───────────────────────────────────────────────────────

#[utoipa::path(
    get,
    path = "/api/v1/tenants/{tenantId}/assets",
    tag = "Estate",
    params(
        ("tenantId" = String, Path, description = "Tenant ID"),
        ("siteId" = Option<String>, Query, description = "Only assets in this site"),
        ("zoneId" = Option<String>, Query, description = "Only assets in this zone"),
        ("status" = Option<String>, Query, description = "OK | Warning | Critical | Offline")
    ),
    responses((status = 200, description = "Matching assets", body = Object))
)]
pub async fn list_assets(
    State(state): State<Arc<AppState>>,
    Path(tenant_id): Path<String>,
    query: Result<Query<AssetFilter>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = decode_query(query)?;
    Ok(data(state.store.list_assets(&tenant_id, &filter)))
}

#[utoipa::path(
    post,
    path = "/api/v1/tenants/{tenantId}/assets",
    tag = "Estate",
    params(("tenantId" = String, Path, description = "Tenant ID")),
    request_body(content = Object, description = "Asset registration"),
    responses(
        (status = 201, description = "Asset created", body = Object),
        (status = 400, description = "Invalid body", body = Object),
        (status = 409, description = "Asset tag already used by this tenant", body = Object)
    )
)]
pub async fn create_asset(
    State(state): State<Arc<AppState>>,
    Path(tenant_id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let input: NewAsset = decode(body)?;
    let asset = state.store.create_asset(&tenant_id, input)?;
    Ok((StatusCode::CREATED, data(asset)))
}

#[utoipa::path(
    get,
    path = "/api/v1/assets/{assetId}",
    tag = "Estate",
    params(("assetId" = String, Path, description = "Asset ID or asset tag")),
    responses(
        (status = 200, description = "Asset", body = Object),
        (status = 404, description = "Asset not found", body = Object)
    )
)]
pub async fn get_asset(
    State(state): State<Arc<AppState>>,
    Path(asset_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(data(state.store.get_asset(&asset_id)?))
}

#[utoipa::path(
    patch,
    path = "/api/v1/assets/{assetId}",
    tag = "Estate",
    params(("assetId" = String, Path, description = "Asset ID or asset tag")),
    request_body(content = Object, description = "`{status?, lastSeenAt?}`"),
    responses(
        (status = 200, description = "Updated asset", body = Object),
        (status = 404, description = "Asset not found", body = Object)
    )
)]
pub async fn patch_asset(
    State(state): State<Arc<AppState>>,
    Path(asset_id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let patch: AssetPatch = decode(body)?;
    Ok(data(state.store.patch_asset(&asset_id, patch)?))
}
