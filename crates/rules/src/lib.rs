//! Fault-detection rule engine for lighting assets.
//!
//! This crate provides:
//! - A fixed, versioned rule set over a single telemetry snapshot
//! - The evaluation engine with per-rule fault isolation
//! - The execution recorder that turns outcomes into auditable records
//! - A replay harness for named fixtures
//! - A capped in-memory execution history

pub mod definitions;
pub mod engine;
pub mod history;
pub mod record;
pub mod replay;
pub mod snapshot;

pub use definitions::{RuleDefinition, RuleFault, RuleKind, RuleOutcome, RuleSet, RuleSetError, Severity};
pub use engine::{evaluate_rules, RuleEngine};
pub use history::{ExecutionHistory, HistoryQuery};
pub use record::{ExecutionRecorder, ExecutionStatus, IdStrategy, RuleExecutionRecord, NO_MATCH};
pub use replay::{fixtures, replay_fixture, ReplayResult};
pub use snapshot::{Telemetry, TelemetrySnapshot};
