//! Canned payloads the simulator posts each tick.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde_json::{json, Value};

pub const TENANT_ID: &str = "demo-tenant";
pub const SITE_ID: &str = "site-london-west";
pub const ZONE_ID: &str = "zone-a";
pub const ASSET_ID: &str = "LUX-0003";
pub const ADAPTER_ID: &str = "adapter-dali-west";

fn iso(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Telemetry batch for an asset whose heartbeat went stale eleven minutes
/// ago and which now draws no power.
pub fn offline_asset(now: DateTime<Utc>) -> Value {
    json!({
        "tenantId": TENANT_ID,
        "siteId": SITE_ID,
        "zoneId": ZONE_ID,
        "assetId": ASSET_ID,
        "adapterId": ADAPTER_ID,
        "rawPayloadRef": format!("sim://offline-asset/{ASSET_ID}"),
        "points": [
            {
                "ts": iso(now - Duration::minutes(11)),
                "metricKey": "heartbeat_age_minutes",
                "metricValue": 11,
                "unit": "minutes",
                "quality": "good"
            },
            {
                "ts": iso(now),
                "metricKey": "power_w",
                "metricValue": 0,
                "unit": "W",
                "quality": "suspect"
            }
        ]
    })
}

/// Operator dims the asset for a night inspection.
pub fn manual_override() -> Value {
    json!({
        "tenantId": TENANT_ID,
        "actorType": "user",
        "actorId": "ops.manager",
        "targetType": "asset",
        "targetId": ASSET_ID,
        "actionType": "manual.override",
        "justification": "Night inspection task for aisle lighting",
        "beforeStateJson": { "dimLevel": 82, "scheduleVersion": 6 },
        "afterStateJson": { "dimLevel": 70, "scheduleVersion": 6 },
        "approvalJson": { "requested": false }
    })
}

/// `sim-<epoch millis>`
pub fn correlation_id(now: DateTime<Utc>) -> String {
    format!("sim-{}", now.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        "2026-02-20T10:00:00Z".parse().unwrap()
    }

    #[test]
    fn offline_batch_backdates_heartbeat() {
        let batch = offline_asset(now());
        let points = batch["points"].as_array().unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0]["ts"], "2026-02-20T09:49:00.000Z");
        assert_eq!(points[1]["ts"], "2026-02-20T10:00:00.000Z");
        assert_eq!(points[1]["quality"], "suspect");
        assert_eq!(batch["rawPayloadRef"], "sim://offline-asset/LUX-0003");
    }

    #[test]
    fn override_passes_ledger_minimums() {
        let body = manual_override();
        assert!(body["justification"].as_str().unwrap().len() >= 5);
        assert!(body["actorId"].as_str().unwrap().len() >= 2);
        assert_eq!(body["afterStateJson"]["dimLevel"], 70);
    }

    #[test]
    fn correlation_id_uses_epoch_millis() {
        assert_eq!(correlation_id(now()), "sim-1771581600000");
    }
}
