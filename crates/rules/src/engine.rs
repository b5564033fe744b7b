//! Rule evaluation engine.
//!
//! Runs every enabled rule, in declaration order, against one snapshot and
//! returns one record per rule. A faulting rule yields a `faulted` record and
//! never stops the rules after it.

use tracing::{debug, warn};

use crate::definitions::RuleSet;
use crate::record::{ExecutionRecorder, IdStrategy, RuleExecutionRecord};
use crate::snapshot::TelemetrySnapshot;

/// Evaluate `rules` against `input` with the given id strategy.
pub fn evaluate_rules(
    rules: &RuleSet,
    input: &TelemetrySnapshot,
    ids: IdStrategy,
) -> Vec<RuleExecutionRecord> {
    let recorder = ExecutionRecorder::new(ids);
    rules
        .iter()
        .filter(|rule| rule.enabled)
        .map(|rule| {
            let result = rule.evaluate(input);
            if let Err(fault) = &result {
                warn!(rule_id = %rule.id, asset_id = %input.asset_id, error = %fault, "rule faulted");
            }
            let record = recorder.record(rule, input, result);
            debug!(
                rule_id = %record.rule_id,
                status = record.status.as_str(),
                outcome = %record.outcome,
                "rule evaluated"
            );
            record
        })
        .collect()
}

/// A rule set bound to a recorder.
#[derive(Debug, Clone, Default)]
pub struct RuleEngine {
    rules: RuleSet,
    recorder: ExecutionRecorder,
}

impl RuleEngine {
    pub fn new(rules: RuleSet, ids: IdStrategy) -> Self {
        Self {
            rules,
            recorder: ExecutionRecorder::new(ids),
        }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn rules_mut(&mut self) -> &mut RuleSet {
        &mut self.rules
    }

    pub fn id_strategy(&self) -> IdStrategy {
        self.recorder.id_strategy()
    }

    pub fn evaluate(&self, input: &TelemetrySnapshot) -> Vec<RuleExecutionRecord> {
        evaluate_rules(&self.rules, input, self.recorder.id_strategy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{ExecutionStatus, NO_MATCH};
    use crate::snapshot::Telemetry;

    fn input(heartbeat: f64, power: f64, expected: f64, faults: u32) -> TelemetrySnapshot {
        TelemetrySnapshot {
            tenant_id: "demo-tenant".into(),
            site_id: "site-london-west".into(),
            zone_id: "zone-a".into(),
            asset_id: "LUX-0003".into(),
            now: "2026-02-20T10:00:00Z".parse().unwrap(),
            telemetry: Telemetry {
                heartbeat_age_minutes: heartbeat,
                power_watts: power,
                expected_power_watts: expected,
                fault_count_24h: faults,
            },
        }
    }

    #[test]
    fn one_record_per_enabled_rule_in_order() {
        let engine = RuleEngine::default();
        let records = engine.evaluate(&input(14.0, 520.0, 420.0, 3));
        let ids: Vec<&str> = records.iter().map(|r| r.rule_id.as_str()).collect();
        assert_eq!(ids, ["offline-threshold", "power-anomaly", "repeated-fault-pattern"]);
    }

    #[test]
    fn disabled_rule_is_skipped() {
        let mut engine = RuleEngine::default();
        engine.rules_mut().set_enabled("power-anomaly", false).unwrap();
        let records = engine.evaluate(&input(14.0, 520.0, 420.0, 3));
        let ids: Vec<&str> = records.iter().map(|r| r.rule_id.as_str()).collect();
        assert_eq!(ids, ["offline-threshold", "repeated-fault-pattern"]);
    }

    #[test]
    fn fault_does_not_stop_later_rules() {
        let records = RuleEngine::default().evaluate(&input(14.0, f64::INFINITY, 420.0, 3));
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].status, ExecutionStatus::Matched);
        assert_eq!(records[1].status, ExecutionStatus::Faulted);
        assert_eq!(records[2].status, ExecutionStatus::Matched);
    }

    #[test]
    fn quiet_input_matches_nothing() {
        let records = RuleEngine::default().evaluate(&input(1.0, 420.0, 420.0, 0));
        assert!(records.iter().all(|r| r.outcome == NO_MATCH));
    }
}
