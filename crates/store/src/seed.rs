//! Demo estate: one tenant, three UK sites, five zones, 120 luminaires and
//! two integration adapters.

use chrono::{Duration, Utc};
use serde_json::json;
use tracing::info;

use luxpulse_core::{
    AdapterRecord, AdapterType, Asset, AssetStatus, Site, Tenant, TenantStatus, Zone,
};

use crate::store::{new_id, Store};

const ASSET_COUNT: usize = 120;

const SITES: [(&str, f64, f64); 3] = [
    ("London West Retail Park", 51.5072, -0.1276),
    ("Birmingham Logistics Hub", 52.4862, -1.8904),
    ("Manchester Commerce Campus", 53.4808, -2.2426),
];

/// (site index, name, type)
const ZONES: [(usize, &str, &str); 5] = [
    (0, "Ground Floor Retail", "retail"),
    (0, "Loading Corridor", "logistics"),
    (1, "Dispatch Hall", "warehouse"),
    (2, "Atrium", "commercial"),
    (2, "Parking Deck", "outdoor"),
];

fn seeded_status(i: usize) -> AssetStatus {
    if i % 19 == 0 {
        AssetStatus::Offline
    } else if i % 11 == 0 {
        AssetStatus::Warning
    } else {
        AssetStatus::Ok
    }
}

impl Store {
    /// Populate the demo estate. A store that already has tenants is left alone.
    pub fn seed_demo_data(&self) {
        let seeded = self.write(|t| {
            if !t.tenants.is_empty() {
                return Ok(false);
            }

            let now = Utc::now();
            let tenant_id = new_id();
            t.tenants.push(Tenant {
                id: tenant_id.clone(),
                name: "Demo FM Tenant".to_string(),
                status: TenantStatus::Active,
                created_at: now,
            });

            let site_ids: Vec<String> = SITES.iter().map(|_| new_id()).collect();
            for ((name, lat, lon), id) in SITES.iter().zip(&site_ids) {
                t.sites.push(Site {
                    id: id.clone(),
                    tenant_id: tenant_id.clone(),
                    name: name.to_string(),
                    timezone: "Europe/London".to_string(),
                    latitude: Some(*lat),
                    longitude: Some(*lon),
                    created_at: now,
                });
            }

            let zone_ids: Vec<String> = ZONES.iter().map(|_| new_id()).collect();
            for ((site, name, zone_type), id) in ZONES.iter().zip(&zone_ids) {
                t.zones.push(Zone {
                    id: id.clone(),
                    tenant_id: tenant_id.clone(),
                    site_id: site_ids[*site].clone(),
                    name: name.to_string(),
                    zone_type: zone_type.to_string(),
                    created_at: now,
                });
            }

            for i in 0..ASSET_COUNT {
                let even = i % 2 == 0;
                t.assets.push(Asset {
                    id: new_id(),
                    tenant_id: tenant_id.clone(),
                    site_id: site_ids[i % site_ids.len()].clone(),
                    zone_id: zone_ids[i % zone_ids.len()].clone(),
                    asset_tag: format!("LUX-{:04}", i + 1),
                    serial_number: format!("SN-{}", 100_000 + i),
                    manufacturer: if even { "VendorA" } else { "VendorB" }.to_string(),
                    model: if i % 3 == 0 { "Linear Bay D4" } else { "Panel L4" }.to_string(),
                    protocol_type: if even { "dali2" } else { "bacnet" }.to_string(),
                    external_ref: None,
                    status: seeded_status(i),
                    last_seen_at: Some(now - Duration::minutes((i % 15) as i64)),
                    created_at: now,
                });
            }

            t.adapters.push(AdapterRecord {
                id: new_id(),
                tenant_id: tenant_id.clone(),
                site_id: site_ids[0].clone(),
                adapter_type: AdapterType::ProtocolGateway,
                name: "DALI Gateway / West".to_string(),
                config_json: json!({ "endpoint": "tcp://edge-gw-west:5020" })
                    .as_object()
                    .cloned()
                    .unwrap_or_default(),
                status: AssetStatus::Ok,
                last_heartbeat_at: now,
                last_success_at: Some(now),
                last_error_at: None,
                created_at: now,
            });
            t.adapters.push(AdapterRecord {
                id: new_id(),
                tenant_id,
                site_id: site_ids[1].clone(),
                adapter_type: AdapterType::VendorApi,
                name: "Vendor Cloud A".to_string(),
                config_json: json!({ "baseUrl": "https://api.vendor-a.example" })
                    .as_object()
                    .cloned()
                    .unwrap_or_default(),
                status: AssetStatus::Warning,
                last_heartbeat_at: now,
                last_success_at: Some(now),
                last_error_at: Some(now),
                created_at: now,
            });
            Ok(true)
        });

        match seeded {
            Ok(true) => info!(assets = ASSET_COUNT, "seeded demo estate"),
            Ok(false) => {}
            Err(e) => tracing::warn!(error = %e, "demo seed skipped"),
        }
    }
}
