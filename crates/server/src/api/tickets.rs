//! Maintenance tickets.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::Value;

use luxpulse_store::{NewTicket, TicketFilter, TicketPatch};

use crate::state::AppState;

use super::{correlation_id, data, data_with_correlation, decode, decode_query, ApiError};

#[utoipa::path(
    get,
    path = "/api/v1/tickets",
    tag = "Tickets",
    params(
        ("tenantId" = Option<String>, Query, description = "Only tickets of this tenant"),
        ("status" = Option<String>, Query, description = "open | assigned | resolved | closed")
    ),
    responses((status = 200, description = "Matching tickets", body = Object))
)]
pub async fn list_tickets(
    State(state): State<Arc<AppState>>,
    query: Result<Query<TicketFilter>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = decode_query(query)?;
    Ok(data(state.store.list_tickets(&filter)))
}

#[utoipa::path(
    post,
    path = "/api/v1/tickets",
    tag = "Tickets",
    request_body(content = Object, description = "Manual ticket"),
    responses(
        (status = 201, description = "Ticket opened", body = Object),
        (status = 400, description = "Invalid body", body = Object)
    )
)]
pub async fn create_ticket(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let input: NewTicket = decode(body)?;
    let ticket = state.store.create_ticket(input)?;
    Ok((StatusCode::CREATED, data(ticket)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/tickets/{ticketId}",
    tag = "Tickets",
    params(("ticketId" = String, Path, description = "Ticket ID")),
    request_body(content = Object, description = "`{status?, assignedTo?, resolutionSummary?, closedAt?}`"),
    responses(
        (status = 200, description = "Updated ticket", body = Object),
        (status = 404, description = "Ticket not found", body = Object)
    )
)]
pub async fn update_ticket(
    State(state): State<Arc<AppState>>,
    Path(ticket_id): Path<String>,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let patch: TicketPatch = decode(body)?;
    let ticket = state.store.update_ticket(&ticket_id, patch)?;
    Ok(data_with_correlation(ticket, correlation_id(&headers)))
}
