//! Write-side payloads and list filters accepted by the store.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use luxpulse_core::{
    AdapterType, AssetStatus, EventSeverity, EventStatus, JsonObject, TicketPriority,
    TicketStatus,
};

use crate::error::{require_min_len, StoreError};

// ── Estate ────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTenant {
    pub name: String,
}

impl NewTenant {
    pub fn validate(&self) -> Result<(), StoreError> {
        require_min_len("name", &self.name, 2)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSite {
    pub name: String,
    pub timezone: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl NewSite {
    pub fn validate(&self) -> Result<(), StoreError> {
        require_min_len("name", &self.name, 2)?;
        require_min_len("timezone", &self.timezone, 2)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewZone {
    pub name: String,
    #[serde(rename = "type")]
    pub zone_type: String,
}

impl NewZone {
    pub fn validate(&self) -> Result<(), StoreError> {
        require_min_len("name", &self.name, 2)?;
        require_min_len("type", &self.zone_type, 2)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAsset {
    pub site_id: String,
    pub zone_id: String,
    pub asset_tag: String,
    pub serial_number: String,
    pub manufacturer: String,
    pub model: String,
    pub protocol_type: String,
    #[serde(default)]
    pub external_ref: Option<String>,
}

impl NewAsset {
    pub fn validate(&self) -> Result<(), StoreError> {
        require_min_len("assetTag", &self.asset_tag, 2)?;
        require_min_len("serialNumber", &self.serial_number, 2)?;
        require_min_len("manufacturer", &self.manufacturer, 2)?;
        require_min_len("model", &self.model, 2)?;
        require_min_len("protocolType", &self.protocol_type, 2)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetPatch {
    pub status: Option<AssetStatus>,
    pub last_seen_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetFilter {
    pub site_id: Option<String>,
    pub zone_id: Option<String>,
    pub status: Option<AssetStatus>,
}

// ── Telemetry ─────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryBatch {
    pub tenant_id: String,
    pub site_id: String,
    pub zone_id: String,
    pub asset_id: String,
    pub adapter_id: String,
    #[serde(default)]
    pub raw_payload_ref: Option<String>,
    pub points: Vec<TelemetryPointInput>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryPointInput {
    pub ts: DateTime<Utc>,
    pub metric_key: String,
    pub metric_value: f64,
    pub unit: String,
    #[serde(default = "default_quality")]
    pub quality: String,
}

fn default_quality() -> String {
    "good".to_string()
}

// ── Events and tickets ────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFilter {
    pub tenant_id: Option<String>,
    pub status: Option<EventStatus>,
    pub severity: Option<EventSeverity>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketFilter {
    pub tenant_id: Option<String>,
    pub status: Option<TicketStatus>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTicket {
    pub tenant_id: String,
    pub site_id: String,
    pub zone_id: String,
    pub asset_id: String,
    #[serde(default)]
    pub source_event_id: Option<String>,
    pub priority: TicketPriority,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub sla_due_at: Option<DateTime<Utc>>,
}

/// Absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketPatch {
    pub status: Option<TicketStatus>,
    pub assigned_to: Option<String>,
    pub resolution_summary: Option<String>,
    pub closed_at: Option<DateTime<Utc>>,
}

// ── Integrations ──────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAdapter {
    pub tenant_id: String,
    pub site_id: String,
    #[serde(rename = "type")]
    pub adapter_type: AdapterType,
    pub name: String,
    pub config_json: JsonObject,
}

impl NewAdapter {
    pub fn validate(&self) -> Result<(), StoreError> {
        require_min_len("name", &self.name, 2)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdapterFilter {
    pub tenant_id: Option<String>,
    pub site_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCredentialSet {
    pub tenant_id: String,
    pub site_id: String,
    pub adapter_id: String,
    pub secret_ref: String,
    pub rotated_by: String,
}

impl NewCredentialSet {
    pub fn validate(&self) -> Result<(), StoreError> {
        require_min_len("secretRef", &self.secret_ref, 3)?;
        require_min_len("rotatedBy", &self.rotated_by, 2)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRotation {
    pub secret_ref: Option<String>,
    pub rotated_by: Option<String>,
}

impl CredentialRotation {
    pub fn validate(&self) -> Result<(), StoreError> {
        if let Some(secret_ref) = &self.secret_ref {
            require_min_len("secretRef", secret_ref, 3)?;
        }
        if let Some(rotated_by) = &self.rotated_by {
            require_min_len("rotatedBy", rotated_by, 2)?;
        }
        Ok(())
    }
}

// ── Evidence ──────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvidencePack {
    pub tenant_id: String,
    pub site_id: String,
    pub requested_by: String,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
}

impl NewEvidencePack {
    pub fn validate(&self) -> Result<(), StoreError> {
        require_min_len("requestedBy", &self.requested_by, 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn telemetry_point_defaults_quality() {
        let point: TelemetryPointInput = serde_json::from_value(serde_json::json!({
            "ts": "2026-02-20T10:00:00.000Z",
            "metricKey": "power_w",
            "metricValue": 0,
            "unit": "W"
        }))
        .unwrap();
        assert_eq!(point.quality, "good");
    }

    #[test]
    fn adapter_type_outside_set_is_rejected() {
        let result: Result<NewAdapter, _> = serde_json::from_value(serde_json::json!({
            "tenantId": "t", "siteId": "s", "type": "mqtt_bridge", "name": "Bridge", "configJson": {}
        }));
        assert!(result.is_err());
    }

    #[test]
    fn rotation_validates_only_present_fields() {
        assert!(CredentialRotation::default().validate().is_ok());
        let short = CredentialRotation { secret_ref: Some("ab".into()), rotated_by: None };
        assert!(short.validate().is_err());
    }
}
