//! Replay harness: run the engine once over a named fixture.
//!
//! No caching and no deduplication. With [`IdStrategy::Random`] two replays of
//! the same input differ only in their event and ticket ids.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::definitions::RuleSet;
use crate::engine::evaluate_rules;
use crate::record::{IdStrategy, RuleExecutionRecord};
use crate::snapshot::TelemetrySnapshot;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayResult {
    pub fixture: String,
    pub input: TelemetrySnapshot,
    pub result: Vec<RuleExecutionRecord>,
}

/// Evaluate `rules` against `input` and tag the result with `fixture`.
pub fn replay_fixture(
    rules: &RuleSet,
    fixture: &str,
    input: TelemetrySnapshot,
    ids: IdStrategy,
) -> ReplayResult {
    let result = evaluate_rules(rules, &input, ids);
    ReplayResult {
        fixture: fixture.to_string(),
        input,
        result,
    }
}

/// Built-in fixtures.
pub mod fixtures {
    use super::*;
    use crate::snapshot::Telemetry;

    pub const OFFLINE_EVENT_TICKET: &str = "offline-event-ticket";

    /// Stale heartbeat plus repeated faults on `LUX-0003`; power is within band.
    pub fn offline_event_ticket(now: DateTime<Utc>) -> TelemetrySnapshot {
        TelemetrySnapshot {
            tenant_id: "demo-tenant".to_string(),
            site_id: "site-london-west".to_string(),
            zone_id: "zone-a".to_string(),
            asset_id: "LUX-0003".to_string(),
            now,
            telemetry: Telemetry {
                heartbeat_age_minutes: 14.0,
                power_watts: 520.0,
                expected_power_watts: 420.0,
                fault_count_24h: 3,
            },
        }
    }

    /// Look a fixture up by name.
    pub fn by_name(name: &str, now: DateTime<Utc>) -> Option<TelemetrySnapshot> {
        match name {
            OFFLINE_EVENT_TICKET => Some(offline_event_ticket(now)),
            _ => None,
        }
    }
}
