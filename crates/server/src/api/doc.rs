//! OpenAPI documentation aggregator.
//!
//! Collects all `#[utoipa::path]`-annotated handlers into a single OpenAPI
//! 3.1 document, served via Scalar UI at `/docs`.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "LuxPulse API",
        version = "0.1.0",
        description = "Lighting-estate monitoring: assets, telemetry, fault rules, tickets and the control-action ledger.",
    ),
    tags(
        (name = "Health", description = "Liveness"),
        (name = "Estate", description = "Tenants, sites, zones and assets"),
        (name = "Telemetry", description = "Metric ingest"),
        (name = "Events", description = "Detected events and acknowledgement"),
        (name = "Tickets", description = "Maintenance tickets"),
        (name = "Control", description = "Append-only control-action ledger and config snapshots"),
        (name = "Integrations", description = "Protocol and vendor adapters with credential sets"),
        (name = "Evidence", description = "Compliance evidence packs"),
        (name = "Rules", description = "Fault rules, replay and execution history"),
    ),
    paths(
        // Health
        crate::api::health::health,
        // Estate
        crate::api::estate::list_tenants,
        crate::api::estate::create_tenant,
        crate::api::estate::list_sites,
        crate::api::estate::create_site,
        crate::api::estate::list_zones,
        crate::api::estate::create_zone,
        crate::api::estate::list_assets,
        crate::api::estate::create_asset,
        crate::api::estate::get_asset,
        crate::api::estate::patch_asset,
        // Telemetry
        crate::api::telemetry::ingest,
        // Events
        crate::api::events::list_events,
        crate::api::events::acknowledge_event,
        // Tickets
        crate::api::tickets::list_tickets,
        crate::api::tickets::create_ticket,
        crate::api::tickets::update_ticket,
        // Control
        crate::api::control::create_schedule,
        crate::api::control::apply_schedule,
        crate::api::control::create_override,
        crate::api::control::history,
        crate::api::control::config_snapshot,
        // Integrations
        crate::api::integrations::register_adapter,
        crate::api::integrations::list_adapters,
        crate::api::integrations::adapter_health,
        crate::api::integrations::create_credential_set,
        crate::api::integrations::rotate_credential_set,
        // Evidence
        crate::api::evidence::create_evidence_pack,
        crate::api::evidence::get_evidence_pack,
        crate::api::evidence::download_evidence_pack,
        // Rules
        crate::api::rules::list_rules,
        crate::api::rules::replay,
        crate::api::rules::rule_executions,
    )
)]
pub struct ApiDoc;
