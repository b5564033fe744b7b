//! Telemetry ingest.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::{json, Value};
use tracing::info;

use luxpulse_store::TelemetryBatch;

use crate::state::AppState;

use super::{correlation_id, decode, ApiError};

/// Accept a batch of metric points for one asset.
///
/// Answers 202 with the number of points stored and the correlation id the
/// batch was accepted under.
#[utoipa::path(
    post,
    path = "/api/v1/telemetry/ingest",
    tag = "Telemetry",
    request_body(content = Object, description = "`{tenantId, siteId, zoneId, assetId, adapterId, rawPayloadRef?, points[]}`"),
    responses(
        (status = 202, description = "Batch accepted", body = Object),
        (status = 400, description = "Invalid body", body = Object)
    )
)]
pub async fn ingest(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let correlation_id = correlation_id(&headers);
    let batch: TelemetryBatch = decode(body)?;
    let asset_id = batch.asset_id.clone();
    let ingested = state.store.ingest_telemetry(batch)?;
    info!(%asset_id, ingested, %correlation_id, "telemetry batch accepted");
    Ok((
        StatusCode::ACCEPTED,
        Json(json!({ "ingested": ingested, "correlationId": correlation_id })),
    ))
}
