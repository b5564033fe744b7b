//! The static, versioned rule set.
//!
//! Rules are data: each [`RuleKind`] variant carries its own threshold
//! constants, and [`RuleSet::builtin`] is the auditable list the worker runs.
//! Declaration order is significant: records are emitted in this order and
//! downstream logs and fixtures diff against it.

use serde::{Deserialize, Serialize};

use luxpulse_core::EventSeverity;

use crate::snapshot::TelemetrySnapshot;

// ── Outcomes ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Critical,
}

impl From<Severity> for EventSeverity {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Warning => EventSeverity::Warning,
            Severity::Critical => EventSeverity::Critical,
        }
    }
}

/// What a matching rule reports. Never stored on its own; the recorder
/// folds it into a [`crate::RuleExecutionRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleOutcome {
    pub event_type: String,
    pub severity: Severity,
    pub open_ticket: bool,
    pub reason: String,
}

/// A predicate could not read the snapshot it was given.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuleFault {
    #[error("telemetry field `{field}` is not a finite number")]
    NonFinite { field: &'static str },

    #[error("telemetry field `{field}` is negative ({value})")]
    Negative { field: &'static str, value: f64 },
}

/// Errors raised while building or changing a [`RuleSet`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuleSetError {
    #[error("duplicate rule id: {0}")]
    DuplicateId(String),

    #[error("rule {0} has version 0; versions start at 1")]
    InvalidVersion(String),

    #[error("unknown rule id: {0}")]
    UnknownRule(String),

    #[error("rule {id} version {proposed} does not advance current version {current}")]
    VersionNotAdvanced { id: String, current: u32, proposed: u32 },
}

// ── Rule kinds ──────────────────────────────────────────────────────

/// Detector logic with its thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleKind {
    /// Fires when the heartbeat is strictly older than the threshold.
    OfflineThreshold { max_heartbeat_age_minutes: f64 },
    /// Fires when |power - expected| / max(expected, 1) strictly exceeds the ratio.
    PowerAnomaly { max_deviation: f64 },
    /// Fires when the 24h fault count reaches the minimum (inclusive).
    RepeatedFaultPattern { min_fault_count: u32 },
}

fn finite(field: &'static str, value: f64) -> Result<f64, RuleFault> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(RuleFault::NonFinite { field })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<f64, RuleFault> {
    let value = finite(field, value)?;
    if value < 0.0 {
        return Err(RuleFault::Negative { field, value });
    }
    Ok(value)
}

/// Fixed one-decimal rendering with exact ties (x.x5) rounded away from
/// zero. `{:.1}` alone rounds those ties to even.
fn one_decimal(value: f64) -> String {
    let tie = (value * 4.0).fract() == 0.0 && (value * 2.0).fract() != 0.0;
    if tie {
        let scaled = value * 10.0;
        let rounded = if scaled.is_sign_negative() { scaled.floor() } else { scaled.ceil() };
        format!("{:.1}", rounded / 10.0)
    } else {
        format!("{:.1}", value)
    }
}

impl RuleKind {
    /// Run the predicate against `input`.
    pub fn evaluate(&self, input: &TelemetrySnapshot) -> Result<Option<RuleOutcome>, RuleFault> {
        let t = &input.telemetry;
        match self {
            RuleKind::OfflineThreshold { max_heartbeat_age_minutes } => {
                let age = non_negative("heartbeatAgeMinutes", t.heartbeat_age_minutes)?;
                if age > *max_heartbeat_age_minutes {
                    return Ok(Some(RuleOutcome {
                        event_type: "asset_offline".to_string(),
                        severity: Severity::Critical,
                        open_ticket: true,
                        reason: format!("Heartbeat age {}m exceeds threshold", age),
                    }));
                }
                Ok(None)
            }
            RuleKind::PowerAnomaly { max_deviation } => {
                let power = finite("powerWatts", t.power_watts)?;
                let expected = finite("expectedPowerWatts", t.expected_power_watts)?;
                let deviation = (power - expected).abs() / expected.max(1.0);
                if deviation > *max_deviation {
                    return Ok(Some(RuleOutcome {
                        event_type: "power_anomaly".to_string(),
                        severity: Severity::Warning,
                        open_ticket: true,
                        reason: format!(
                            "Power deviation {}% exceeds {}%",
                            one_decimal(deviation * 100.0),
                            max_deviation * 100.0
                        ),
                    }));
                }
                Ok(None)
            }
            RuleKind::RepeatedFaultPattern { min_fault_count } => {
                if t.fault_count_24h >= *min_fault_count {
                    return Ok(Some(RuleOutcome {
                        event_type: "repeated_fault_pattern".to_string(),
                        severity: Severity::Warning,
                        open_ticket: true,
                        reason: format!("Fault count in 24h is {}", t.fault_count_24h),
                    }));
                }
                Ok(None)
            }
        }
    }
}

// ── Definitions ─────────────────────────────────────────────────────

/// A named, versioned rule. `id` never changes once published; any change
/// to the predicate bumps `version`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleDefinition {
    pub id: String,
    pub version: u32,
    pub enabled: bool,
    pub description: String,
    #[serde(flatten)]
    pub kind: RuleKind,
}

impl RuleDefinition {
    pub fn new(id: &str, version: u32, description: &str, kind: RuleKind) -> Self {
        Self {
            id: id.to_string(),
            version,
            enabled: true,
            description: description.to_string(),
            kind,
        }
    }

    pub fn evaluate(&self, input: &TelemetrySnapshot) -> Result<Option<RuleOutcome>, RuleFault> {
        self.kind.evaluate(input)
    }
}

/// Ordered rule set with unique ids.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleSet {
    rules: Vec<RuleDefinition>,
}

impl RuleSet {
    /// Build a rule set, rejecting duplicate ids and version 0.
    pub fn new(rules: Vec<RuleDefinition>) -> Result<Self, RuleSetError> {
        let mut seen = std::collections::HashSet::new();
        for rule in &rules {
            if rule.version == 0 {
                return Err(RuleSetError::InvalidVersion(rule.id.clone()));
            }
            if !seen.insert(rule.id.as_str()) {
                return Err(RuleSetError::DuplicateId(rule.id.clone()));
            }
        }
        Ok(Self { rules })
    }

    /// The three built-in detectors, in evaluation order.
    pub fn builtin() -> Self {
        Self {
            rules: vec![
                RuleDefinition::new(
                    "offline-threshold",
                    3,
                    "No heartbeat over threshold minutes",
                    RuleKind::OfflineThreshold { max_heartbeat_age_minutes: 10.0 },
                ),
                RuleDefinition::new(
                    "power-anomaly",
                    2,
                    "Power draw anomaly versus expected baseline",
                    RuleKind::PowerAnomaly { max_deviation: 0.25 },
                ),
                RuleDefinition::new(
                    "repeated-fault-pattern",
                    1,
                    "Repeated faults in rolling 24h window",
                    RuleKind::RepeatedFaultPattern { min_fault_count: 3 },
                ),
            ],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &RuleDefinition> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&RuleDefinition> {
        self.rules.iter().find(|r| r.id == id)
    }

    /// Enable or disable a rule in place.
    pub fn set_enabled(&mut self, id: &str, enabled: bool) -> Result<(), RuleSetError> {
        let rule = self
            .rules
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| RuleSetError::UnknownRule(id.to_string()))?;
        rule.enabled = enabled;
        Ok(())
    }

    /// Replace a rule's definition. The version must strictly increase so a
    /// version number is never reused with different semantics.
    pub fn upgrade(&mut self, definition: RuleDefinition) -> Result<(), RuleSetError> {
        let slot = self
            .rules
            .iter_mut()
            .find(|r| r.id == definition.id)
            .ok_or_else(|| RuleSetError::UnknownRule(definition.id.clone()))?;
        if definition.version <= slot.version {
            return Err(RuleSetError::VersionNotAdvanced {
                id: definition.id,
                current: slot.version,
                proposed: definition.version,
            });
        }
        *slot = definition;
        Ok(())
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::builtin()
    }
}
