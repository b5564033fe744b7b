//! Engine input: one telemetry snapshot for one asset.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Everything a rule may read for a single evaluation call.
///
/// `now` is the evaluation time recorded on every execution record; it is
/// never replaced by the wall clock, which keeps replays reproducible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetrySnapshot {
    pub tenant_id: String,
    pub site_id: String,
    pub zone_id: String,
    pub asset_id: String,
    pub now: DateTime<Utc>,
    pub telemetry: Telemetry,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Telemetry {
    pub heartbeat_age_minutes: f64,
    pub power_watts: f64,
    pub expected_power_watts: f64,
    #[serde(rename = "faultCount24h")]
    pub fault_count_24h: u32,
}

impl TelemetrySnapshot {
    /// `now` rendered as RFC 3339 with a `Z` suffix. Whole milliseconds
    /// print as `.sssZ`; finer instants keep their micro or nano digits so
    /// distinct inputs never share a timestamp.
    pub fn now_iso(&self) -> String {
        let format = if self.now.timestamp_subsec_nanos() % 1_000_000 == 0 {
            SecondsFormat::Millis
        } else {
            SecondsFormat::AutoSi
        };
        self.now.to_rfc3339_opts(format, true)
    }

    /// Opaque reference tying a record back to the input that produced it.
    pub fn input_ref(&self) -> String {
        format!("replay:{}:{}", self.asset_id, self.now_iso())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialises_camel_case_payload() {
        let snapshot: TelemetrySnapshot = serde_json::from_value(serde_json::json!({
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
        }))
        .unwrap();

        assert_eq!(snapshot.asset_id, "LUX-0003");
        assert_eq!(snapshot.telemetry.fault_count_24h, 3);
        assert_eq!(snapshot.telemetry.heartbeat_age_minutes, 14.0);
    }

    #[test]
    fn input_ref_uses_millisecond_timestamp() {
        let snapshot = TelemetrySnapshot {
            tenant_id: "t".into(),
            site_id: "s".into(),
            zone_id: "z".into(),
            asset_id: "LUX-0001".into(),
            now: "2026-02-20T10:00:00Z".parse().unwrap(),
            telemetry: Telemetry {
                heartbeat_age_minutes: 0.0,
                power_watts: 0.0,
                expected_power_watts: 1.0,
                fault_count_24h: 0,
            },
        };
        assert_eq!(snapshot.input_ref(), "replay:LUX-0001:2026-02-20T10:00:00.000Z");
    }

    #[test]
    fn sub_millisecond_instants_keep_distinct_input_refs() {
        let at = |now: &str| TelemetrySnapshot {
            tenant_id: "t".into(),
            site_id: "s".into(),
            zone_id: "z".into(),
            asset_id: "LUX-0001".into(),
            now: now.parse().unwrap(),
            telemetry: Telemetry {
                heartbeat_age_minutes: 0.0,
                power_watts: 0.0,
                expected_power_watts: 1.0,
                fault_count_24h: 0,
            },
        };
        let a = at("2026-02-20T10:00:00.123456Z");
        let b = at("2026-02-20T10:00:00.123789Z");
        assert_eq!(a.now_iso(), "2026-02-20T10:00:00.123456Z");
        assert_eq!(b.input_ref(), "replay:LUX-0001:2026-02-20T10:00:00.123789Z");
        assert_ne!(a.input_ref(), b.input_ref());

        // offsets normalise to the same instant in UTC
        let offset = at("2026-02-20T11:00:00.500+01:00");
        assert_eq!(offset.now_iso(), "2026-02-20T10:00:00.500Z");
    }

    #[test]
    fn negative_fault_count_is_rejected() {
        let result: Result<Telemetry, _> = serde_json::from_value(serde_json::json!({
            "heartbeatAgeMinutes": 1,
            "powerWatts": 1,
            "expectedPowerWatts": 1,
            "faultCount24h": -1
        }));
        assert!(result.is_err());
    }
}
