//! The entity repository.
//!
//! Every table lives behind one `RwLock`, so a handler's read-check-write
//! sequence is atomic with respect to other handlers on other threads.

use std::sync::RwLock;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use luxpulse_core::evidence::{build_evidence_manifest, EvidenceScope};
use luxpulse_core::{
    AdapterHealth, AdapterRecord, Asset, AssetStatus, ControlAction, CredentialSet, EventRecord,
    EventStatus, EvidencePack, EvidencePackStatus, Site, TelemetryPoint, Tenant, TenantStatus,
    Ticket, TicketStatus, Zone,
};

use crate::error::StoreError;
use crate::inputs::*;

#[derive(Default)]
pub(crate) struct Tables {
    pub(crate) closed: bool,
    pub(crate) tenants: Vec<Tenant>,
    pub(crate) sites: Vec<Site>,
    pub(crate) zones: Vec<Zone>,
    pub(crate) assets: Vec<Asset>,
    pub(crate) telemetry: Vec<TelemetryPoint>,
    pub(crate) events: Vec<EventRecord>,
    pub(crate) tickets: Vec<Ticket>,
    pub(crate) control_actions: Vec<ControlAction>,
    pub(crate) adapters: Vec<AdapterRecord>,
    pub(crate) credential_sets: Vec<CredentialSet>,
    pub(crate) evidence_packs: Vec<EvidencePack>,
}

/// What `GET /evidence-packs/{id}/download` hands back.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceDownload {
    pub artifact_ref: Option<String>,
    pub manifest: Value,
}

/// Control actions in effect for one site, split by kind.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigSnapshot {
    pub tenant_id: String,
    pub site_id: String,
    pub as_of: DateTime<Utc>,
    pub schedules: Vec<ControlAction>,
    pub overrides: Vec<ControlAction>,
}

pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// In-memory store for the estate, operations data and the control ledger.
#[derive(Default)]
pub struct Store {
    tables: RwLock<Tables>,
}

impl Store {
    /// An empty, open store.
    pub fn new() -> Self {
        Self::default()
    }

    /// An open store holding the demo estate.
    pub fn seeded() -> Self {
        let store = Self::new();
        store.seed_demo_data();
        store
    }

    /// Reject every later write. Reads keep working.
    pub fn close(&self) {
        let mut tables = self.tables.write().expect("store lock poisoned");
        if !tables.closed {
            tables.closed = true;
            info!("store closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.read(|t| t.closed)
    }

    pub(crate) fn read<R>(&self, f: impl FnOnce(&Tables) -> R) -> R {
        let tables = self.tables.read().expect("store lock poisoned");
        f(&tables)
    }

    pub(crate) fn write<R>(
        &self,
        f: impl FnOnce(&mut Tables) -> Result<R, StoreError>,
    ) -> Result<R, StoreError> {
        let mut tables = self.tables.write().expect("store lock poisoned");
        if tables.closed {
            return Err(StoreError::Closed);
        }
        f(&mut tables)
    }

    // ── Tenants, sites, zones ───────────────────────────────

    pub fn list_tenants(&self) -> Vec<Tenant> {
        self.read(|t| t.tenants.clone())
    }

    pub fn create_tenant(&self, input: NewTenant) -> Result<Tenant, StoreError> {
        input.validate()?;
        self.write(|t| {
            let tenant = Tenant {
                id: new_id(),
                name: input.name,
                status: TenantStatus::Active,
                created_at: Utc::now(),
            };
            t.tenants.push(tenant.clone());
            Ok(tenant)
        })
    }

    pub fn list_sites(&self, tenant_id: &str) -> Vec<Site> {
        self.read(|t| {
            t.sites
                .iter()
                .filter(|s| s.tenant_id == tenant_id)
                .cloned()
                .collect()
        })
    }

    pub fn create_site(&self, tenant_id: &str, input: NewSite) -> Result<Site, StoreError> {
        input.validate()?;
        self.write(|t| {
            let site = Site {
                id: new_id(),
                tenant_id: tenant_id.to_string(),
                name: input.name,
                timezone: input.timezone,
                latitude: input.latitude,
                longitude: input.longitude,
                created_at: Utc::now(),
            };
            t.sites.push(site.clone());
            Ok(site)
        })
    }

    pub fn list_zones(&self, tenant_id: &str, site_id: &str) -> Vec<Zone> {
        self.read(|t| {
            t.zones
                .iter()
                .filter(|z| z.tenant_id == tenant_id && z.site_id == site_id)
                .cloned()
                .collect()
        })
    }

    pub fn create_zone(
        &self,
        tenant_id: &str,
        site_id: &str,
        input: NewZone,
    ) -> Result<Zone, StoreError> {
        input.validate()?;
        self.write(|t| {
            let zone = Zone {
                id: new_id(),
                tenant_id: tenant_id.to_string(),
                site_id: site_id.to_string(),
                name: input.name,
                zone_type: input.zone_type,
                created_at: Utc::now(),
            };
            t.zones.push(zone.clone());
            Ok(zone)
        })
    }

    // ── Assets ──────────────────────────────────────────────

    pub fn list_assets(&self, tenant_id: &str, filter: &AssetFilter) -> Vec<Asset> {
        self.read(|t| {
            t.assets
                .iter()
                .filter(|a| a.tenant_id == tenant_id)
                .filter(|a| filter.site_id.as_ref().map_or(true, |s| &a.site_id == s))
                .filter(|a| filter.zone_id.as_ref().map_or(true, |z| &a.zone_id == z))
                .filter(|a| filter.status.map_or(true, |s| a.status == s))
                .cloned()
                .collect()
        })
    }

    /// Create an asset. Asset tags are unique per tenant.
    pub fn create_asset(&self, tenant_id: &str, input: NewAsset) -> Result<Asset, StoreError> {
        input.validate()?;
        self.write(|t| {
            if t
                .assets
                .iter()
                .any(|a| a.tenant_id == tenant_id && a.asset_tag == input.asset_tag)
            {
                return Err(StoreError::Conflict(format!(
                    "asset tag {} already exists for tenant {}",
                    input.asset_tag, tenant_id
                )));
            }
            let asset = Asset {
                id: new_id(),
                tenant_id: tenant_id.to_string(),
                site_id: input.site_id,
                zone_id: input.zone_id,
                asset_tag: input.asset_tag,
                serial_number: input.serial_number,
                manufacturer: input.manufacturer,
                model: input.model,
                protocol_type: input.protocol_type,
                external_ref: input.external_ref,
                status: AssetStatus::Ok,
                last_seen_at: None,
                created_at: Utc::now(),
            };
            t.assets.push(asset.clone());
            Ok(asset)
        })
    }

    /// Look an asset up by id or by asset tag.
    pub fn get_asset(&self, id_or_tag: &str) -> Result<Asset, StoreError> {
        self.read(|t| {
            t.assets
                .iter()
                .find(|a| a.id == id_or_tag || a.asset_tag == id_or_tag)
                .cloned()
                .ok_or_else(|| StoreError::not_found("Asset", id_or_tag))
        })
    }

    pub fn patch_asset(&self, id_or_tag: &str, patch: AssetPatch) -> Result<Asset, StoreError> {
        self.write(|t| {
            let asset = t
                .assets
                .iter_mut()
                .find(|a| a.id == id_or_tag || a.asset_tag == id_or_tag)
                .ok_or_else(|| StoreError::not_found("Asset", id_or_tag))?;
            if let Some(status) = patch.status {
                asset.status = status;
            }
            if let Some(last_seen_at) = patch.last_seen_at {
                asset.last_seen_at = Some(last_seen_at);
            }
            Ok(asset.clone())
        })
    }

    // ── Telemetry ───────────────────────────────────────────

    /// Store a batch of points for one asset; returns how many were stored.
    pub fn ingest_telemetry(&self, batch: TelemetryBatch) -> Result<usize, StoreError> {
        self.write(|t| {
            let count = batch.points.len();
            for point in batch.points {
                t.telemetry.push(TelemetryPoint {
                    id: new_id(),
                    tenant_id: batch.tenant_id.clone(),
                    site_id: batch.site_id.clone(),
                    zone_id: batch.zone_id.clone(),
                    asset_id: batch.asset_id.clone(),
                    ts: point.ts,
                    metric_key: point.metric_key,
                    metric_value: point.metric_value,
                    unit: point.unit,
                    quality: point.quality,
                    adapter_id: batch.adapter_id.clone(),
                    raw_payload_ref: batch.raw_payload_ref.clone(),
                });
            }
            debug!(asset_id = %batch.asset_id, count, "telemetry ingested");
            Ok(count)
        })
    }

    pub fn telemetry_for_asset(&self, asset_id: &str) -> Vec<TelemetryPoint> {
        self.read(|t| {
            t.telemetry
                .iter()
                .filter(|p| p.asset_id == asset_id)
                .cloned()
                .collect()
        })
    }

    // ── Events ──────────────────────────────────────────────

    pub fn list_events(&self, filter: &EventFilter) -> Vec<EventRecord> {
        self.read(|t| {
            t.events
                .iter()
                .filter(|e| filter.tenant_id.as_ref().map_or(true, |id| &e.tenant_id == id))
                .filter(|e| filter.status.map_or(true, |s| e.status == s))
                .filter(|e| filter.severity.map_or(true, |s| e.severity == s))
                .cloned()
                .collect()
        })
    }

    pub fn acknowledge_event(&self, event_id: &str) -> Result<EventRecord, StoreError> {
        self.write(|t| {
            let event = t
                .events
                .iter_mut()
                .find(|e| e.id == event_id)
                .ok_or_else(|| StoreError::not_found("Event", event_id))?;
            event.status = EventStatus::Acknowledged;
            event.acknowledged_at = Some(Utc::now());
            Ok(event.clone())
        })
    }

    // ── Tickets ─────────────────────────────────────────────

    pub fn list_tickets(&self, filter: &TicketFilter) -> Vec<Ticket> {
        self.read(|t| {
            t.tickets
                .iter()
                .filter(|k| filter.tenant_id.as_ref().map_or(true, |id| &k.tenant_id == id))
                .filter(|k| filter.status.map_or(true, |s| k.status == s))
                .cloned()
                .collect()
        })
    }

    /// A ticket with an assignee starts `assigned`, otherwise `open`.
    pub fn create_ticket(&self, input: NewTicket) -> Result<Ticket, StoreError> {
        self.write(|t| {
            let status = if input.assigned_to.is_some() {
                TicketStatus::Assigned
            } else {
                TicketStatus::Open
            };
            let ticket = Ticket {
                id: new_id(),
                tenant_id: input.tenant_id,
                site_id: input.site_id,
                zone_id: input.zone_id,
                asset_id: input.asset_id,
                source_event_id: input.source_event_id,
                status,
                priority: input.priority,
                opened_at: Utc::now(),
                assigned_to: input.assigned_to,
                sla_due_at: input.sla_due_at,
                closed_at: None,
                resolution_summary: None,
            };
            t.tickets.push(ticket.clone());
            Ok(ticket)
        })
    }

    pub fn update_ticket(&self, ticket_id: &str, patch: TicketPatch) -> Result<Ticket, StoreError> {
        self.write(|t| {
            let ticket = t
                .tickets
                .iter_mut()
                .find(|k| k.id == ticket_id)
                .ok_or_else(|| StoreError::not_found("Ticket", ticket_id))?;
            if let Some(status) = patch.status {
                ticket.status = status;
            }
            if let Some(assigned_to) = patch.assigned_to {
                ticket.assigned_to = Some(assigned_to);
            }
            if let Some(summary) = patch.resolution_summary {
                ticket.resolution_summary = Some(summary);
            }
            if let Some(closed_at) = patch.closed_at {
                ticket.closed_at = Some(closed_at);
            }
            Ok(ticket.clone())
        })
    }

    // ── Integrations ────────────────────────────────────────

    pub fn register_adapter(&self, input: NewAdapter) -> Result<AdapterRecord, StoreError> {
        input.validate()?;
        self.write(|t| {
            let now = Utc::now();
            let adapter = AdapterRecord {
                id: new_id(),
                tenant_id: input.tenant_id,
                site_id: input.site_id,
                adapter_type: input.adapter_type,
                name: input.name,
                config_json: input.config_json,
                status: AssetStatus::Ok,
                last_heartbeat_at: now,
                last_success_at: Some(now),
                last_error_at: None,
                created_at: now,
            };
            t.adapters.push(adapter.clone());
            Ok(adapter)
        })
    }

    pub fn list_adapters(&self, filter: &AdapterFilter) -> Vec<AdapterRecord> {
        self.read(|t| {
            t.adapters
                .iter()
                .filter(|a| filter.tenant_id.as_ref().map_or(true, |id| &a.tenant_id == id))
                .filter(|a| filter.site_id.as_ref().map_or(true, |id| &a.site_id == id))
                .cloned()
                .collect()
        })
    }

    pub fn adapter_health(&self, adapter_id: &str) -> Result<AdapterHealth, StoreError> {
        self.read(|t| {
            t.adapters
                .iter()
                .find(|a| a.id == adapter_id)
                .map(AdapterHealth::from)
                .ok_or_else(|| StoreError::not_found("Adapter", adapter_id))
        })
    }

    pub fn create_credential_set(
        &self,
        input: NewCredentialSet,
    ) -> Result<CredentialSet, StoreError> {
        input.validate()?;
        self.write(|t| {
            let now = Utc::now();
            let credential_set = CredentialSet {
                id: new_id(),
                tenant_id: input.tenant_id,
                site_id: input.site_id,
                adapter_id: input.adapter_id,
                secret_ref: input.secret_ref,
                rotated_at: now,
                rotated_by: input.rotated_by,
                created_at: now,
            };
            t.credential_sets.push(credential_set.clone());
            Ok(credential_set)
        })
    }

    /// Swap in a new secret reference and stamp the rotation time.
    pub fn rotate_credential_set(
        &self,
        credential_set_id: &str,
        rotation: CredentialRotation,
    ) -> Result<CredentialSet, StoreError> {
        rotation.validate()?;
        self.write(|t| {
            let credential_set = t
                .credential_sets
                .iter_mut()
                .find(|c| c.id == credential_set_id)
                .ok_or_else(|| StoreError::not_found("Credential set", credential_set_id))?;
            if let Some(secret_ref) = rotation.secret_ref {
                credential_set.secret_ref = secret_ref;
            }
            if let Some(rotated_by) = rotation.rotated_by {
                credential_set.rotated_by = rotated_by;
            }
            credential_set.rotated_at = Utc::now();
            Ok(credential_set.clone())
        })
    }

    // ── Evidence packs ──────────────────────────────────────

    /// Build the manifest and register the pack as ready.
    pub fn create_evidence_pack(&self, input: NewEvidencePack) -> Result<EvidencePack, StoreError> {
        input.validate()?;
        let id = new_id();
        let manifest = build_evidence_manifest(&EvidenceScope {
            tenant_id: input.tenant_id.clone(),
            site_id: input.site_id.clone(),
            period_start: input.period_start.to_rfc3339_opts(SecondsFormat::Millis, true),
            period_end: input.period_end.to_rfc3339_opts(SecondsFormat::Millis, true),
        });
        let mut manifest_json = serde_json::to_value(&manifest)
            .map_err(|e| StoreError::Validation(e.to_string()))?;
        if let Value::Object(map) = &mut manifest_json {
            map.insert("id".to_string(), Value::String(id.clone()));
        }

        self.write(|t| {
            let now = Utc::now();
            let pack = EvidencePack {
                artifact_ref: Some(format!("minio://evidence/{id}.zip")),
                id,
                tenant_id: input.tenant_id,
                site_id: input.site_id,
                requested_by: input.requested_by,
                period_start: input.period_start,
                period_end: input.period_end,
                status: EvidencePackStatus::Ready,
                manifest_json,
                created_at: now,
                completed_at: Some(now),
            };
            t.evidence_packs.push(pack.clone());
            Ok(pack)
        })
    }

    pub fn get_evidence_pack(&self, pack_id: &str) -> Result<EvidencePack, StoreError> {
        self.read(|t| {
            t.evidence_packs
                .iter()
                .find(|p| p.id == pack_id)
                .cloned()
                .ok_or_else(|| StoreError::not_found("Evidence pack", pack_id))
        })
    }

    pub fn evidence_download(&self, pack_id: &str) -> Result<EvidenceDownload, StoreError> {
        let pack = self.get_evidence_pack(pack_id)?;
        Ok(EvidenceDownload {
            artifact_ref: pack.artifact_ref,
            manifest: pack.manifest_json,
        })
    }

    // ── Config snapshot ─────────────────────────────────────

    /// Control actions targeting `site_id`, split into schedule and override
    /// changes by action type.
    pub fn config_snapshot(&self, tenant_id: &str, site_id: &str, at: DateTime<Utc>) -> ConfigSnapshot {
        self.read(|t| {
            let actions: Vec<&ControlAction> = t
                .control_actions
                .iter()
                .filter(|a| a.tenant_id == tenant_id && a.target_id == site_id)
                .collect();
            ConfigSnapshot {
                tenant_id: tenant_id.to_string(),
                site_id: site_id.to_string(),
                as_of: at,
                schedules: actions
                    .iter()
                    .filter(|a| a.action_type.contains("schedule"))
                    .map(|a| (*a).clone())
                    .collect(),
                overrides: actions
                    .iter()
                    .filter(|a| a.action_type.contains("override"))
                    .map(|a| (*a).clone())
                    .collect(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_asset(tag: &str) -> NewAsset {
        NewAsset {
            site_id: "site-1".into(),
            zone_id: "zone-1".into(),
            asset_tag: tag.into(),
            serial_number: "SN-1".into(),
            manufacturer: "VendorA".into(),
            model: "Panel L4".into(),
            protocol_type: "dali2".into(),
            external_ref: None,
        }
    }

    #[test]
    fn tenant_name_too_short() {
        let store = Store::new();
        let err = store.create_tenant(NewTenant { name: "A".into() }).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(store.list_tenants().is_empty());
    }

    #[test]
    fn asset_tag_unique_per_tenant() {
        let store = Store::new();
        store.create_asset("t1", new_asset("LUX-1")).unwrap();
        let err = store.create_asset("t1", new_asset("LUX-1")).unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        // same tag under another tenant is fine
        store.create_asset("t2", new_asset("LUX-1")).unwrap();
    }

    #[test]
    fn asset_lookup_by_tag_and_patch() {
        let store = Store::new();
        let created = store.create_asset("t1", new_asset("LUX-7")).unwrap();
        assert_eq!(store.get_asset("LUX-7").unwrap().id, created.id);
        assert_eq!(store.get_asset(&created.id).unwrap().asset_tag, "LUX-7");

        let patched = store
            .patch_asset("LUX-7", AssetPatch { status: Some(AssetStatus::Offline), last_seen_at: None })
            .unwrap();
        assert_eq!(patched.status, AssetStatus::Offline);
        assert!(matches!(store.get_asset("LUX-8"), Err(StoreError::NotFound { .. })));
    }

    #[test]
    fn closed_store_rejects_writes_but_serves_reads() {
        let store = Store::seeded();
        store.close();
        assert!(store.is_closed());
        assert_eq!(
            store.create_tenant(NewTenant { name: "Other".into() }).unwrap_err(),
            StoreError::Closed
        );
        assert_eq!(store.list_tenants().len(), 1);
    }

    #[test]
    fn ticket_status_follows_assignee() {
        let store = Store::new();
        let base = NewTicket {
            tenant_id: "t".into(),
            site_id: "s".into(),
            zone_id: "z".into(),
            asset_id: "a".into(),
            source_event_id: None,
            priority: luxpulse_core::TicketPriority::High,
            assigned_to: None,
            sla_due_at: None,
        };
        assert_eq!(store.create_ticket(base.clone()).unwrap().status, TicketStatus::Open);
        let assigned = NewTicket { assigned_to: Some("tech.1".into()), ..base };
        let ticket = store.create_ticket(assigned).unwrap();
        assert_eq!(ticket.status, TicketStatus::Assigned);

        let updated = store
            .update_ticket(
                &ticket.id,
                TicketPatch {
                    status: Some(TicketStatus::Resolved),
                    resolution_summary: Some("Driver replaced".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.status, TicketStatus::Resolved);
        assert_eq!(updated.assigned_to.as_deref(), Some("tech.1"));
    }

    #[test]
    fn evidence_pack_is_ready_with_artifact_ref() {
        let store = Store::new();
        let pack = store
            .create_evidence_pack(NewEvidencePack {
                tenant_id: "demo-tenant".into(),
                site_id: "site-london-west".into(),
                requested_by: "auditor".into(),
                period_start: "2026-02-15T00:00:00Z".parse().unwrap(),
                period_end: "2026-02-22T23:59:59.999Z".parse().unwrap(),
            })
            .unwrap();
        assert_eq!(pack.status, EvidencePackStatus::Ready);
        assert_eq!(pack.artifact_ref, Some(format!("minio://evidence/{}.zip", pack.id)));
        assert_eq!(pack.manifest_json["id"], pack.id.as_str());
        assert_eq!(pack.manifest_json["includes"].as_array().unwrap().len(), 6);

        let download = store.evidence_download(&pack.id).unwrap();
        assert_eq!(download.manifest, pack.manifest_json);
    }
}
