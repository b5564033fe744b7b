//! Domain-focused API endpoint modules.
//!
//! Each sub-module owns one area of the `/api/v1` surface. Shared response
//! envelope, error mapping and body decoding live here.

pub mod control;
pub mod doc;
pub mod estate;
pub mod events;
pub mod evidence;
pub mod health;
pub mod integrations;
pub mod rules;
pub mod telemetry;
pub mod tickets;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Json, Query};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use luxpulse_store::{resolve_correlation_id, StoreError};

pub const CORRELATION_HEADER: &str = "x-correlation-id";

// ── Response envelope ────────────────────────────────────────────

/// `{"data": ..., "correlationId": ...}`; the id is omitted when not set.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

pub fn data<T: Serialize>(data: T) -> Json<Envelope<T>> {
    Json(Envelope { data, correlation_id: None })
}

pub fn data_with_correlation<T: Serialize>(data: T, correlation_id: String) -> Json<Envelope<T>> {
    Json(Envelope { data, correlation_id: Some(correlation_id) })
}

/// The request's `x-correlation-id` when non-blank, else a fresh one.
pub fn correlation_id(headers: &HeaderMap) -> String {
    resolve_correlation_id(
        headers
            .get(CORRELATION_HEADER)
            .and_then(|value| value.to_str().ok()),
    )
}

// ── Errors ───────────────────────────────────────────────────────

/// Error response rendered as `{"error": "<message>"}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self { status: StatusCode::BAD_REQUEST, message: message.into() }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self { status: StatusCode::NOT_FOUND, message: message.into() }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        let status = match &err {
            StoreError::Validation(_) => StatusCode::BAD_REQUEST,
            StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
            StoreError::Conflict(_) => StatusCode::CONFLICT,
            StoreError::Closed => StatusCode::SERVICE_UNAVAILABLE,
        };
        if status == StatusCode::SERVICE_UNAVAILABLE {
            warn!(error = %err, "write rejected");
        }
        Self { status, message: err.to_string() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({ "error": self.message }))).into_response()
    }
}

// ── Decoding ─────────────────────────────────────────────────────

/// Decode a JSON body into `T`. Syntax errors, missing fields and values
/// outside an enum's set all map to 400.
pub fn decode<T: DeserializeOwned>(body: Result<Json<Value>, JsonRejection>) -> Result<T, ApiError> {
    let Json(value) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;
    serde_json::from_value(value).map_err(|e| ApiError::bad_request(e.to_string()))
}

/// Query-string counterpart of [`decode`].
pub fn decode_query<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    query
        .map(|Query(q)| q)
        .map_err(|e| ApiError::bad_request(e.body_text()))
}
