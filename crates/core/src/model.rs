//! Canonical domain model shared by the API, the store and the worker.
//!
//! Field names serialise in camelCase to match the dashboard's JSON contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;

/// Free-form JSON object (`beforeStateJson`, `configJson`, ...).
pub type JsonObject = Map<String, Value>;

macro_rules! string_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(CoreError::UnknownVariant {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

// ── Enumerations ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TenantStatus {
    Active,
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetStatus {
    #[serde(rename = "OK")]
    Ok,
    Warning,
    Critical,
    Offline,
}

string_enum!(AssetStatus, "asset status", {
    Ok => "OK",
    Warning => "Warning",
    Critical => "Critical",
    Offline => "Offline",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventSeverity {
    Info,
    Warning,
    Critical,
}

string_enum!(EventSeverity, "event severity", {
    Info => "info",
    Warning => "warning",
    Critical => "critical",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Open,
    Acknowledged,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Open,
    Assigned,
    Resolved,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketPriority {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorType {
    User,
    System,
}

string_enum!(ActorType, "actor type", {
    User => "user",
    System => "system",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    Tenant,
    Site,
    Zone,
    Asset,
}

string_enum!(TargetType, "target type", {
    Tenant => "tenant",
    Site => "site",
    Zone => "zone",
    Asset => "asset",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterType {
    ProtocolGateway,
    VendorApi,
    FileOnboarding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvidencePackStatus {
    Queued,
    Processing,
    Ready,
    Failed,
}

// ── Estate hierarchy ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: String,
    pub name: String,
    pub status: TenantStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub timezone: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    pub id: String,
    pub tenant_id: String,
    pub site_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub zone_type: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    pub tenant_id: String,
    pub site_id: String,
    pub zone_id: String,
    pub asset_tag: String,
    pub serial_number: String,
    pub manufacturer: String,
    pub model: String,
    pub protocol_type: String,
    pub external_ref: Option<String>,
    pub status: AssetStatus,
    pub last_seen_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

// ── Telemetry, events, tickets ────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryPoint {
    pub id: String,
    pub tenant_id: String,
    pub site_id: String,
    pub zone_id: String,
    pub asset_id: String,
    pub ts: DateTime<Utc>,
    pub metric_key: String,
    pub metric_value: f64,
    pub unit: String,
    pub quality: String,
    pub adapter_id: String,
    pub raw_payload_ref: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub id: String,
    pub tenant_id: String,
    pub site_id: String,
    pub zone_id: String,
    pub asset_id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub severity: EventSeverity,
    pub status: EventStatus,
    pub detected_at: DateTime<Utc>,
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub rule_id: Option<String>,
    pub rule_version: Option<u32>,
    pub correlation_id: String,
    pub raw_payload_ref: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: String,
    pub tenant_id: String,
    pub site_id: String,
    pub zone_id: String,
    pub asset_id: String,
    pub source_event_id: Option<String>,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub opened_at: DateTime<Utc>,
    pub assigned_to: Option<String>,
    pub sla_due_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub resolution_summary: Option<String>,
}

// ── Control actions ───────────────────────────────────────────

/// One append-only ledger entry describing a manual or system change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlAction {
    pub id: String,
    pub tenant_id: String,
    pub actor_type: ActorType,
    pub actor_id: String,
    pub target_type: TargetType,
    pub target_id: String,
    pub action_type: String,
    pub justification: String,
    pub before_state_json: JsonObject,
    pub after_state_json: JsonObject,
    pub approval_json: Option<JsonObject>,
    pub correlation_id: String,
    pub adapter_response_ref: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ── Integrations ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdapterRecord {
    pub id: String,
    pub tenant_id: String,
    pub site_id: String,
    #[serde(rename = "type")]
    pub adapter_type: AdapterType,
    pub name: String,
    pub config_json: JsonObject,
    pub status: AssetStatus,
    pub last_heartbeat_at: DateTime<Utc>,
    pub last_success_at: Option<DateTime<Utc>>,
    pub last_error_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdapterHealth {
    pub adapter_id: String,
    pub status: AssetStatus,
    pub last_heartbeat_at: DateTime<Utc>,
    pub last_success_at: Option<DateTime<Utc>>,
    pub last_error_at: Option<DateTime<Utc>>,
}

impl From<&AdapterRecord> for AdapterHealth {
    fn from(adapter: &AdapterRecord) -> Self {
        Self {
            adapter_id: adapter.id.clone(),
            status: adapter.status,
            last_heartbeat_at: adapter.last_heartbeat_at,
            last_success_at: adapter.last_success_at,
            last_error_at: adapter.last_error_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialSet {
    pub id: String,
    pub tenant_id: String,
    pub site_id: String,
    pub adapter_id: String,
    pub secret_ref: String,
    pub rotated_at: DateTime<Utc>,
    pub rotated_by: String,
    pub created_at: DateTime<Utc>,
}

// ── Evidence packs ────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidencePack {
    pub id: String,
    pub tenant_id: String,
    pub site_id: String,
    pub requested_by: String,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub status: EvidencePackStatus,
    pub manifest_json: Value,
    pub artifact_ref: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_status_uses_dashboard_spelling() {
        let json = serde_json::to_string(&AssetStatus::Ok).unwrap();
        assert_eq!(json, "\"OK\"");
        assert_eq!("Offline".parse::<AssetStatus>().unwrap(), AssetStatus::Offline);
    }

    #[test]
    fn target_type_rejects_unknown_value() {
        let err = "building".parse::<TargetType>().unwrap_err();
        assert!(err.to_string().contains("target type"));
        assert!(serde_json::from_str::<TargetType>("\"building\"").is_err());
    }

    #[test]
    fn zone_type_serialises_as_type() {
        let zone = Zone {
            id: "z1".into(),
            tenant_id: "t1".into(),
            site_id: "s1".into(),
            name: "Atrium".into(),
            zone_type: "commercial".into(),
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(&zone).unwrap();
        assert_eq!(value["type"], "commercial");
        assert_eq!(value["siteId"], "s1");
    }
}
