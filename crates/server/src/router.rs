//! HTTP router construction.
//!
//! Assembles all Axum routes, middleware, and OpenAPI docs into a single `Router`.

use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::api;
use crate::state::AppState;

/// `*` allows any origin; anything else is a single allowed origin.
fn cors_layer(origin: &str) -> CorsLayer {
    if origin == "*" {
        return CorsLayer::permissive();
    }
    match origin.parse::<HeaderValue>() {
        Ok(value) => CorsLayer::new()
            .allow_origin(value)
            .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
            .allow_headers(Any),
        Err(e) => {
            warn!(origin, error = %e, "invalid CORS origin, allowing any");
            CorsLayer::permissive()
        }
    }
}

fn api_v1() -> Router<Arc<AppState>> {
    Router::new()
        // Estate
        .route(
            "/tenants",
            get(api::estate::list_tenants).post(api::estate::create_tenant),
        )
        .route(
            "/tenants/{tenantId}/sites",
            get(api::estate::list_sites).post(api::estate::create_site),
        )
        .route(
            "/tenants/{tenantId}/sites/{siteId}/zones",
            get(api::estate::list_zones).post(api::estate::create_zone),
        )
        .route(
            "/tenants/{tenantId}/assets",
            get(api::estate::list_assets).post(api::estate::create_asset),
        )
        .route(
            "/assets/{assetId}",
            get(api::estate::get_asset).patch(api::estate::patch_asset),
        )
        // Telemetry, events, tickets
        .route("/telemetry/ingest", post(api::telemetry::ingest))
        .route("/events", get(api::events::list_events))
        .route(
            "/events/{eventId}/acknowledge",
            post(api::events::acknowledge_event),
        )
        .route(
            "/tickets",
            get(api::tickets::list_tickets).post(api::tickets::create_ticket),
        )
        .route("/tickets/{ticketId}", patch(api::tickets::update_ticket))
        // Control ledger: /schedules/apply is its own route, not a schedule id
        .route("/control/schedules", post(api::control::create_schedule))
        .route("/control/schedules/apply", post(api::control::apply_schedule))
        .route("/control/overrides", post(api::control::create_override))
        .route("/control/history", get(api::control::history))
        .route("/snapshots/config", get(api::control::config_snapshot))
        // Integrations
        .route(
            "/integrations/adapters",
            get(api::integrations::list_adapters).post(api::integrations::register_adapter),
        )
        .route(
            "/integrations/adapters/{adapterId}/health",
            get(api::integrations::adapter_health),
        )
        .route(
            "/integrations/credentials",
            post(api::integrations::create_credential_set),
        )
        .route(
            "/integrations/credentials/{credentialSetId}/rotate",
            post(api::integrations::rotate_credential_set),
        )
        // Evidence
        .route("/evidence-packs", post(api::evidence::create_evidence_pack))
        .route(
            "/evidence-packs/{packId}",
            get(api::evidence::get_evidence_pack),
        )
        .route(
            "/evidence-packs/{packId}/download",
            get(api::evidence::download_evidence_pack),
        )
        // Rules: /replay MUST precede /{ruleId} paths
        .route("/rules", get(api::rules::list_rules))
        .route("/rules/replay", post(api::rules::replay))
        .route(
            "/rules/{ruleId}/executions",
            get(api::rules::rule_executions),
        )
}

/// Build the complete application router with all routes and middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.server.cors_origin);
    Router::new()
        .route("/health", get(api::health::health))
        .nest("/api/v1", api_v1())
        .layer(cors)
        .with_state(state)
        .merge(Scalar::with_url("/docs", api::doc::ApiDoc::openapi()))
}
