//! Router-level tests driven through `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use luxpulse_core::Config;
use luxpulse_server::{build_router, AppState};
use luxpulse_store::Store;

fn app_with(store: Arc<Store>) -> Router {
    build_router(Arc::new(AppState::new(Config::for_profile(""), store)))
}

fn app() -> Router {
    app_with(Arc::new(Store::seeded()))
}

fn app_with_derived_ids() -> Router {
    let mut config = Config::for_profile("");
    config.worker.deterministic_ids = true;
    build_router(Arc::new(AppState::new(config, Arc::new(Store::seeded()))))
}

fn fixed_replay_body() -> Value {
    json!({
        "fixture": "offline-event-ticket",
        "persist": true,
        "input": {
            "tenantId": "demo-tenant",
            "siteId": "site-london-west",
            "zoneId": "zone-a",
            "assetId": "LUX-0003",
            "now": "2026-02-20T10:00:00.000Z",
            "telemetry": {
                "heartbeatAgeMinutes": 14,
                "powerWatts": 520,
                "expectedPowerWatts": 420,
                "faultCount24h": 3
            }
        }
    })
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn override_body() -> Value {
    json!({
        "tenantId": "demo-tenant",
        "actorType": "user",
        "actorId": "ops.manager",
        "targetType": "asset",
        "targetId": "LUX-0003",
        "actionType": "anything",
        "justification": "Night inspection task for aisle lighting",
        "beforeStateJson": { "dimLevel": 82, "scheduleVersion": 6 },
        "afterStateJson": { "dimLevel": 70, "scheduleVersion": 6 },
        "approvalJson": { "requested": false }
    })
}

#[tokio::test]
async fn health_reports_service_name() {
    let (status, body) = send(app(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["service"], "luxpulse-api");
}

#[tokio::test]
async fn seeded_tenant_is_listed() {
    let (status, body) = send(app(), get("/api/v1/tenants")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["name"], "Demo FM Tenant");
}

#[tokio::test]
async fn override_route_stamps_action_type_and_echoes_correlation_id() {
    let app = app();
    let mut request = post("/api/v1/control/overrides", override_body());
    request
        .headers_mut()
        .insert("x-correlation-id", "sim-1700000000000".parse().unwrap());

    let (status, body) = send(app.clone(), request).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["correlationId"], "sim-1700000000000");
    assert_eq!(body["data"]["actionType"], "manual.override");
    assert_eq!(body["data"]["correlationId"], "sim-1700000000000");
    assert!(body["data"]["adapterResponseRef"].is_null());

    let (status, body) = send(app, get("/api/v1/control/history?targetId=LUX-0003")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn schedule_apply_route_is_not_a_schedule_id() {
    let (status, body) = send(app(), post("/api/v1/control/schedules/apply", override_body())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["actionType"], "schedule.apply");
    assert!(!body["correlationId"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn short_justification_is_rejected_without_write() {
    let app = app();
    let mut body = override_body();
    body["justification"] = json!("okay");

    let (status, err) = send(app.clone(), post("/api/v1/control/overrides", body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(err["error"].as_str().unwrap().contains("justification"));

    let (_, history) = send(app, get("/api/v1/control/history")).await;
    assert!(history["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn unknown_actor_type_is_a_bad_request() {
    let mut body = override_body();
    body["actorType"] = json!("robot");
    let (status, _) = send(app(), post("/api/v1/control/overrides", body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn config_snapshot_requires_all_parameters() {
    let (status, body) = send(
        app(),
        get("/api/v1/snapshots/config?tenantId=demo-tenant&siteId=site-london-west"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "tenantId, siteId, and at are required");
}

#[tokio::test]
async fn config_snapshot_splits_schedules_and_overrides() {
    let app = app();
    let mut body = override_body();
    body["targetType"] = json!("site");
    body["targetId"] = json!("site-london-west");
    send(app.clone(), post("/api/v1/control/schedules", body.clone())).await;
    send(app.clone(), post("/api/v1/control/overrides", body)).await;

    let (status, snapshot) = send(
        app,
        get("/api/v1/snapshots/config?tenantId=demo-tenant&siteId=site-london-west&at=2026-02-20T10:00:00Z"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(snapshot["data"]["schedules"].as_array().unwrap().len(), 1);
    assert_eq!(snapshot["data"]["overrides"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn telemetry_ingest_is_accepted() {
    let body = json!({
        "tenantId": "demo-tenant",
        "siteId": "site-london-west",
        "zoneId": "zone-a",
        "assetId": "LUX-0003",
        "adapterId": "adapter-dali-west",
        "rawPayloadRef": "sim://offline-asset/LUX-0003",
        "points": [
            { "ts": "2026-02-20T09:49:00.000Z", "metricKey": "heartbeat_age_minutes", "metricValue": 11, "unit": "minutes", "quality": "good" },
            { "ts": "2026-02-20T10:00:00.000Z", "metricKey": "power_w", "metricValue": 0, "unit": "W", "quality": "suspect" }
        ]
    });
    let (status, body) = send(app(), post("/api/v1/telemetry/ingest", body)).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["ingested"], 2);
    assert!(body["correlationId"].is_string());
}

#[tokio::test]
async fn replay_with_persist_materialises_events_and_history() {
    let app = app();
    let (status, body) = send(
        app.clone(),
        post(
            "/api/v1/rules/replay",
            json!({ "fixture": "offline-event-ticket", "persist": true }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let result = body["data"]["result"].as_array().unwrap();
    assert_eq!(result.len(), 3);
    assert_eq!(result[0]["ruleId"], "offline-threshold");
    assert_eq!(result[1]["outcome"], "no match");
    assert_eq!(body["data"]["derived"]["events"].as_array().unwrap().len(), 2);

    let (_, events) = send(app.clone(), get("/api/v1/events")).await;
    assert_eq!(events["data"].as_array().unwrap().len(), 2);
    let (_, tickets) = send(app.clone(), get("/api/v1/tickets")).await;
    assert_eq!(tickets["data"].as_array().unwrap().len(), 2);

    let (status, history) = send(app, get("/api/v1/rules/offline-threshold/executions")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history["data"].as_array().unwrap().len(), 1);
    assert_eq!(history["data"][0]["status"], "matched");
}

#[tokio::test]
async fn replay_without_persist_writes_no_events() {
    let app = app();
    let (status, body) = send(
        app.clone(),
        post("/api/v1/rules/replay", json!({ "fixture": "offline-event-ticket" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].get("derived").is_none());

    let (_, events) = send(app, get("/api/v1/events")).await;
    assert!(events["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn replay_of_unknown_fixture_is_a_bad_request() {
    let (status, body) = send(
        app(),
        post("/api/v1/rules/replay", json!({ "fixture": "does-not-exist" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("does-not-exist"));
}

#[tokio::test]
async fn executions_for_unknown_rule_is_not_found() {
    let (status, _) = send(app(), get("/api/v1/rules/no-such-rule/executions")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn rules_are_listed_in_evaluation_order() {
    let (status, body) = send(app(), get("/api/v1/rules")).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["offline-threshold", "power-anomaly", "repeated-fault-pattern"]);
    assert_eq!(body["data"][0]["version"], 3);
}

#[tokio::test]
async fn unknown_asset_is_not_found() {
    let (status, body) = send(app(), get("/api/v1/assets/LUX-9999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("LUX-9999"));
}

#[tokio::test]
async fn asset_lookup_by_tag() {
    let (status, body) = send(app(), get("/api/v1/assets/LUX-0003")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["assetTag"], "LUX-0003");
}

#[tokio::test]
async fn writes_after_close_are_unavailable() {
    let store = Arc::new(Store::new());
    let app = app_with(store.clone());
    store.close();
    let (status, _) = send(app, post("/api/v1/tenants", json!({ "name": "Late Tenant" }))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn evidence_pack_round_trip() {
    let app = app();
    let (status, body) = send(
        app.clone(),
        post(
            "/api/v1/evidence-packs",
            json!({
                "tenantId": "demo-tenant",
                "siteId": "site-london-west",
                "requestedBy": "auditor",
                "periodStart": "2026-01-01T00:00:00Z",
                "periodEnd": "2026-01-31T23:59:59Z"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, download) = send(app, get(&format!("/api/v1/evidence-packs/{id}/download"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(download["data"]["artifactRef"], format!("minio://evidence/{id}.zip"));
    assert_eq!(download["data"]["manifest"]["id"], id);
}

#[tokio::test]
async fn rejected_persist_leaves_history_untouched() {
    let app = app_with_derived_ids();
    let (status, _) = send(app.clone(), post("/api/v1/rules/replay", fixed_replay_body())).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(app.clone(), post("/api/v1/rules/replay", fixed_replay_body())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("already recorded"));

    let (_, history) = send(app.clone(), get("/api/v1/rules/offline-threshold/executions")).await;
    assert_eq!(history["data"].as_array().unwrap().len(), 1);
    let (_, events) = send(app, get("/api/v1/events")).await;
    assert_eq!(events["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn executions_since_must_be_a_timestamp() {
    let app = app();
    send(
        app.clone(),
        post("/api/v1/rules/replay", json!({ "fixture": "offline-event-ticket" })),
    )
    .await;

    let (status, _) = send(
        app.clone(),
        get("/api/v1/rules/offline-threshold/executions?since=garbage"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        app.clone(),
        get("/api/v1/rules/offline-threshold/executions?since=2000-01-01T00:00:00Z"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (_, body) = send(
        app,
        get("/api/v1/rules/offline-threshold/executions?since=2999-01-01T00:00:00Z"),
    )
    .await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn history_cap_bounds_the_execution_history() {
    let mut config = Config::for_profile("");
    config.worker.history_cap = 2;
    let app = build_router(Arc::new(AppState::new(config, Arc::new(Store::seeded()))));

    for _ in 0..3 {
        let (status, _) = send(
            app.clone(),
            post("/api/v1/rules/replay", json!({ "fixture": "offline-event-ticket" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, history) = send(app, get("/api/v1/rules/offline-threshold/executions")).await;
    assert_eq!(history["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn negative_reading_faults_only_the_rule_that_reads_it() {
    let mut body = fixed_replay_body();
    body["persist"] = json!(false);
    body["input"]["telemetry"]["heartbeatAgeMinutes"] = json!(-5);

    let (status, body) = send(app(), post("/api/v1/rules/replay", body)).await;
    assert_eq!(status, StatusCode::OK);
    let result = body["data"]["result"].as_array().unwrap();
    assert_eq!(result[0]["status"], "faulted");
    assert!(result[0]["outcome"].as_str().unwrap().starts_with("error: "));
    assert!(result[0]["outputEventId"].is_null());
    assert_eq!(result[2]["status"], "matched");
}
