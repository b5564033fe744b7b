//! Evidence-pack manifest builder.
//!
//! A manifest lists the artifacts an evidence pack would contain and a
//! SHA-256 checksum per artifact derived from the pack's scope
//! (`tenant:site:start:end:<suffix>`). Identical scopes always yield identical
//! checksums; only `generated_at` varies between calls.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Artifact files included in every evidence pack, in manifest order.
pub const EVIDENCE_ARTIFACTS: [&str; 6] = [
    "asset_registry_snapshot.json",
    "config_snapshot.json",
    "schedule_snapshot.json",
    "override_log.csv",
    "fault_summary.json",
    "kpi_summary.json",
];

/// Scope of an evidence pack.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceScope {
    pub tenant_id: String,
    pub site_id: String,
    pub period_start: String,
    pub period_end: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceChecksums {
    pub asset_registry_snapshot: String,
    pub config_snapshot: String,
    pub schedule_snapshot: String,
    pub override_log: String,
    pub fault_summary: String,
    pub kpi_summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceManifest {
    pub generated_at: DateTime<Utc>,
    pub includes: Vec<String>,
    pub checksums: EvidenceChecksums,
}

/// Build the manifest for `scope`.
pub fn build_evidence_manifest(scope: &EvidenceScope) -> EvidenceManifest {
    let base = format!(
        "{}:{}:{}:{}",
        scope.tenant_id, scope.site_id, scope.period_start, scope.period_end
    );
    let checksum = |suffix: &str| sha256_hex(&format!("{}:{}", base, suffix));

    EvidenceManifest {
        generated_at: Utc::now(),
        includes: EVIDENCE_ARTIFACTS.iter().map(|s| s.to_string()).collect(),
        checksums: EvidenceChecksums {
            asset_registry_snapshot: checksum("assets"),
            config_snapshot: checksum("config"),
            schedule_snapshot: checksum("schedules"),
            override_log: checksum("overrides"),
            fault_summary: checksum("faults"),
            kpi_summary: checksum("kpi"),
        },
    }
}

/// Lowercase hex SHA-256 of `input`.
pub fn sha256_hex(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    format!("{digest:x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope() -> EvidenceScope {
        EvidenceScope {
            tenant_id: "demo-tenant".into(),
            site_id: "site-london-west".into(),
            period_start: "2026-02-15T00:00:00.000Z".into(),
            period_end: "2026-02-22T23:59:59.999Z".into(),
        }
    }

    #[test]
    fn checksums_are_deterministic() {
        let a = build_evidence_manifest(&scope());
        let b = build_evidence_manifest(&scope());
        assert_eq!(a.checksums, b.checksums);
    }

    #[test]
    fn checksum_matches_scope_string() {
        let m = build_evidence_manifest(&scope());
        let expected = sha256_hex(
            "demo-tenant:site-london-west:2026-02-15T00:00:00.000Z:2026-02-22T23:59:59.999Z:assets",
        );
        assert_eq!(m.checksums.asset_registry_snapshot, expected);
        assert_eq!(m.checksums.asset_registry_snapshot.len(), 64);
    }

    #[test]
    fn different_site_changes_every_checksum() {
        let a = build_evidence_manifest(&scope());
        let mut other = scope();
        other.site_id = "site-birmingham".into();
        let b = build_evidence_manifest(&other);
        assert_ne!(a.checksums.config_snapshot, b.checksums.config_snapshot);
        assert_ne!(a.checksums.kpi_summary, b.checksums.kpi_summary);
    }

    #[test]
    fn includes_lists_six_artifacts() {
        let m = build_evidence_manifest(&scope());
        assert_eq!(m.includes.len(), 6);
        assert_eq!(m.includes[3], "override_log.csv");
    }

    #[test]
    fn sha256_of_empty_string() {
        assert_eq!(
            sha256_hex(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
