//! Control-action ledger writes, history and config snapshots.
//!
//! The three write routes share one body shape. The submitted `actionType`
//! must pass validation but is then replaced by the route's own type, so a
//! schedule route can never record an override and vice versa.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use luxpulse_store::{action_types, ControlActionInput, HistoryFilter};

use crate::state::AppState;

use super::{correlation_id, data, data_with_correlation, decode, decode_query, ApiError};

async fn append_as(
    state: &AppState,
    headers: &HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
    action_type: &str,
) -> Result<impl IntoResponse, ApiError> {
    let correlation_id = correlation_id(headers);
    let mut input: ControlActionInput = decode(body)?;
    input.validate()?;
    input.action_type = action_type.to_string();

    let action = state.store.ledger().append(input, Some(&correlation_id))?;
    Ok((StatusCode::CREATED, data_with_correlation(action, correlation_id)))
}

#[utoipa::path(
    post,
    path = "/api/v1/control/schedules",
    tag = "Control",
    request_body(content = Object, description = "Control action; recorded as `schedule.create`"),
    responses(
        (status = 201, description = "Ledger entry", body = Object),
        (status = 400, description = "Invalid body", body = Object)
    )
)]
pub async fn create_schedule(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    append_as(&state, &headers, body, action_types::SCHEDULE_CREATE).await
}

#[utoipa::path(
    post,
    path = "/api/v1/control/schedules/apply",
    tag = "Control",
    request_body(content = Object, description = "Control action; recorded as `schedule.apply`"),
    responses(
        (status = 201, description = "Ledger entry", body = Object),
        (status = 400, description = "Invalid body", body = Object)
    )
)]
pub async fn apply_schedule(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    append_as(&state, &headers, body, action_types::SCHEDULE_APPLY).await
}

#[utoipa::path(
    post,
    path = "/api/v1/control/overrides",
    tag = "Control",
    request_body(content = Object, description = "Control action; recorded as `manual.override`"),
    responses(
        (status = 201, description = "Ledger entry", body = Object),
        (status = 400, description = "Invalid body", body = Object)
    )
)]
pub async fn create_override(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    append_as(&state, &headers, body, action_types::MANUAL_OVERRIDE).await
}

#[utoipa::path(
    get,
    path = "/api/v1/control/history",
    tag = "Control",
    params(
        ("tenantId" = Option<String>, Query, description = "Only actions of this tenant"),
        ("targetType" = Option<String>, Query, description = "tenant | site | zone | asset"),
        ("targetId" = Option<String>, Query, description = "Only actions on this target")
    ),
    responses((status = 200, description = "Ledger entries in insertion order", body = Object))
)]
pub async fn history(
    State(state): State<Arc<AppState>>,
    query: Result<Query<HistoryFilter>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = decode_query(query)?;
    Ok(data(state.store.ledger().history(&filter)))
}

// ── Snapshots ────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotQuery {
    pub tenant_id: Option<String>,
    pub site_id: Option<String>,
    pub at: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v1/snapshots/config",
    tag = "Control",
    params(
        ("tenantId" = String, Query, description = "Tenant ID"),
        ("siteId" = String, Query, description = "Site ID"),
        ("at" = String, Query, description = "Point in time (RFC 3339)")
    ),
    responses(
        (status = 200, description = "Schedules and overrides recorded for the site", body = Object),
        (status = 400, description = "Missing or malformed parameters", body = Object)
    )
)]
pub async fn config_snapshot(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SnapshotQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let query = decode_query(query)?;
    let (Some(tenant_id), Some(site_id), Some(at)) = (query.tenant_id, query.site_id, query.at)
    else {
        return Err(ApiError::bad_request("tenantId, siteId, and at are required"));
    };
    let at: DateTime<Utc> = at
        .parse()
        .map_err(|e| ApiError::bad_request(format!("at: {e}")))?;
    Ok(data(state.store.config_snapshot(&tenant_id, &site_id, at)))
}
