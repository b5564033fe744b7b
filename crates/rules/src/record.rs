//! Execution records: the immutable audit row every rule evaluation leaves.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::definitions::{RuleDefinition, RuleFault, RuleOutcome, Severity};
use crate::snapshot::TelemetrySnapshot;

/// Outcome recorded when a rule did not fire.
pub const NO_MATCH: &str = "no match";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Matched,
    NoMatch,
    Faulted,
}

impl ExecutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionStatus::Matched => "matched",
            ExecutionStatus::NoMatch => "no_match",
            ExecutionStatus::Faulted => "faulted",
        }
    }
}

/// One rule evaluated against one input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleExecutionRecord {
    pub rule_id: String,
    pub rule_version: u32,
    pub input_ref: String,
    pub output_event_id: Option<String>,
    pub output_ticket_id: Option<String>,
    /// The outcome's reason when matched, [`NO_MATCH`] otherwise, `error: ...` on a fault.
    pub outcome: String,
    pub executed_at: String,
    pub status: ExecutionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
}

impl RuleExecutionRecord {
    pub fn is_match(&self) -> bool {
        self.status == ExecutionStatus::Matched
    }
}

/// How output event and ticket ids are minted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdStrategy {
    /// `evt-<uuid v4>` / `tkt-<uuid v4>`; unique per evaluation.
    #[default]
    Random,
    /// Hash of rule id, input ref and kind; identical inputs yield identical ids.
    Derived,
}

impl IdStrategy {
    fn mint(&self, prefix: &str, rule_id: &str, input_ref: &str) -> String {
        match self {
            IdStrategy::Random => format!("{}-{}", prefix, Uuid::new_v4()),
            IdStrategy::Derived => {
                let digest = Sha256::digest(format!("{rule_id}|{input_ref}|{prefix}").as_bytes());
                let hex = format!("{digest:x}");
                format!("{}-{}", prefix, &hex[..32])
            }
        }
    }
}

/// Turns predicate results into records. Rule-agnostic.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecutionRecorder {
    ids: IdStrategy,
}

impl ExecutionRecorder {
    pub fn new(ids: IdStrategy) -> Self {
        Self { ids }
    }

    pub fn id_strategy(&self) -> IdStrategy {
        self.ids
    }

    pub fn record(
        &self,
        rule: &RuleDefinition,
        input: &TelemetrySnapshot,
        result: Result<Option<RuleOutcome>, RuleFault>,
    ) -> RuleExecutionRecord {
        let input_ref = input.input_ref();
        let mut record = RuleExecutionRecord {
            rule_id: rule.id.clone(),
            rule_version: rule.version,
            input_ref,
            output_event_id: None,
            output_ticket_id: None,
            outcome: NO_MATCH.to_string(),
            executed_at: input.now_iso(),
            status: ExecutionStatus::NoMatch,
            event_type: None,
            severity: None,
        };

        match result {
            Ok(None) => {}
            Ok(Some(outcome)) => {
                let event_id = self.ids.mint("evt", &rule.id, &record.input_ref);
                record.output_ticket_id = outcome
                    .open_ticket
                    .then(|| self.ids.mint("tkt", &rule.id, &record.input_ref));
                record.output_event_id = Some(event_id);
                record.outcome = outcome.reason;
                record.status = ExecutionStatus::Matched;
                record.event_type = Some(outcome.event_type);
                record.severity = Some(outcome.severity);
            }
            Err(fault) => {
                record.outcome = format!("error: {fault}");
                record.status = ExecutionStatus::Faulted;
            }
        }
        record
    }
}
