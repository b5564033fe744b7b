//! Rule definitions, replay and execution history.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use luxpulse_rules::{fixtures, replay_fixture, HistoryQuery, ReplayResult, TelemetrySnapshot};
use luxpulse_store::DerivedOutputs;

use crate::state::AppState;

use super::{data, decode, decode_query, ApiError};

// ── Types ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct RuleSummary {
    pub id: String,
    pub version: u32,
    pub enabled: bool,
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct ReplayRequest {
    pub fixture: String,
    /// Explicit snapshot; when absent the named built-in fixture is used.
    #[serde(default)]
    pub input: Option<TelemetrySnapshot>,
    /// Materialise matched records as events and tickets.
    #[serde(default)]
    pub persist: bool,
}

#[derive(Debug, Serialize)]
pub struct ReplayResponse {
    #[serde(flatten)]
    pub replay: ReplayResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub derived: Option<DerivedOutputs>,
}

// ── Handlers ────────────────────────────────────────────────────────

/// List the active rule set in evaluation order.
#[utoipa::path(
    get,
    path = "/api/v1/rules",
    tag = "Rules",
    responses((status = 200, description = "Rule definitions", body = Object))
)]
pub async fn list_rules(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let summaries: Vec<RuleSummary> = state
        .engine
        .rules()
        .iter()
        .map(|rule| RuleSummary {
            id: rule.id.clone(),
            version: rule.version,
            enabled: rule.enabled,
            description: rule.description.clone(),
        })
        .collect();
    data(summaries)
}

/// Run every enabled rule once over a fixture.
///
/// With `persist` set, matched records are first written to the store as
/// events and tickets. The records land in the execution history once the
/// replay succeeds; a rejected persist leaves the history untouched.
#[utoipa::path(
    post,
    path = "/api/v1/rules/replay",
    tag = "Rules",
    request_body(content = Object, description = "`{fixture, input?, persist?}`"),
    responses(
        (status = 200, description = "Replay result", body = Object),
        (status = 400, description = "Unknown fixture or invalid input", body = Object),
        (status = 409, description = "Derived ids already recorded", body = Object)
    )
)]
pub async fn replay(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let request: ReplayRequest = decode(body)?;
    let input = match request.input {
        Some(input) => input,
        None => fixtures::by_name(&request.fixture, Utc::now())
            .ok_or_else(|| ApiError::bad_request(format!("unknown fixture: {}", request.fixture)))?,
    };

    let replay = replay_fixture(
        state.engine.rules(),
        &request.fixture,
        input,
        state.engine.id_strategy(),
    );
    let derived = if request.persist {
        Some(state.store.record_executions(&replay.input, &replay.result)?)
    } else {
        None
    };
    // only replays that were answered successfully reach the history
    state.history.record(&replay.result);

    info!(
        fixture = %replay.fixture,
        asset_id = %replay.input.asset_id,
        matched = replay.result.iter().filter(|r| r.is_match()).count(),
        persisted = request.persist,
        "replay complete"
    );
    Ok(data(ReplayResponse { replay, derived }))
}

/// Execution records for one rule, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/rules/{ruleId}/executions",
    tag = "Rules",
    params(
        ("ruleId" = String, Path, description = "Rule ID"),
        ("status" = Option<String>, Query, description = "matched | no_match | faulted"),
        ("limit" = Option<u32>, Query, description = "Maximum records (default 100)"),
        ("since" = Option<String>, Query, description = "Only records at or after this RFC 3339 time")
    ),
    responses(
        (status = 200, description = "Execution records", body = Object),
        (status = 400, description = "Malformed query parameters", body = Object),
        (status = 404, description = "Rule not found", body = Object)
    )
)]
pub async fn rule_executions(
    State(state): State<Arc<AppState>>,
    Path(rule_id): Path<String>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let params = decode_query(query)?;
    if state.engine.rules().get(&rule_id).is_none() {
        return Err(ApiError::not_found(format!("Rule not found: {rule_id}")));
    }
    Ok(data(state.history.query(&rule_id, &params)))
}
