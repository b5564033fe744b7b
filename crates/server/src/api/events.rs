//! Detected events.

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;

use luxpulse_store::EventFilter;

use crate::state::AppState;

use super::{correlation_id, data, data_with_correlation, decode_query, ApiError};

#[utoipa::path(
    get,
    path = "/api/v1/events",
    tag = "Events",
    params(
        ("tenantId" = Option<String>, Query, description = "Only events of this tenant"),
        ("status" = Option<String>, Query, description = "open | acknowledged | closed"),
        ("severity" = Option<String>, Query, description = "info | warning | critical")
    ),
    responses((status = 200, description = "Matching events", body = Object))
)]
pub async fn list_events(
    State(state): State<Arc<AppState>>,
    query: Result<Query<EventFilter>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = decode_query(query)?;
    Ok(data(state.store.list_events(&filter)))
}

#[utoipa::path(
    post,
    path = "/api/v1/events/{eventId}/acknowledge",
    tag = "Events",
    params(("eventId" = String, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Acknowledged event", body = Object),
        (status = 404, description = "Event not found", body = Object)
    )
)]
pub async fn acknowledge_event(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<String>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let event = state.store.acknowledge_event(&event_id)?;
    Ok(data_with_correlation(event, correlation_id(&headers)))
}
