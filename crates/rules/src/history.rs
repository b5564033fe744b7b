//! In-memory execution history per rule.
//!
//! Keeps the most recent records per rule id, capped at a configurable
//! maximum (default 500) with FIFO eviction. Uses `std::sync::RwLock` so the
//! worker loop and HTTP handlers can share it without an async lock.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::record::{ExecutionStatus, RuleExecutionRecord};

const DEFAULT_CAP: usize = 500;
const DEFAULT_LIMIT: usize = 100;

/// Filters for [`ExecutionHistory::query`].
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    /// Only records with this status.
    pub status: Option<ExecutionStatus>,
    /// Maximum number of records to return (default 100).
    pub limit: Option<u32>,
    /// Only records executed at or after this instant (RFC 3339).
    pub since: Option<DateTime<Utc>>,
}

/// Per-rule execution history with FIFO eviction.
#[derive(Clone)]
pub struct ExecutionHistory {
    entries: Arc<RwLock<HashMap<String, VecDeque<RuleExecutionRecord>>>>,
    max_entries_per_rule: usize,
}

impl ExecutionHistory {
    pub fn new() -> Self {
        Self::with_max_entries(DEFAULT_CAP)
    }

    pub fn with_max_entries(max: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            max_entries_per_rule: max,
        }
    }

    /// Append records, each under its own rule id.
    pub fn record(&self, records: &[RuleExecutionRecord]) {
        let mut guard = self.entries.write().expect("execution history lock poisoned");
        for record in records {
            let deque = guard.entry(record.rule_id.clone()).or_default();
            deque.push_back(record.clone());
            while deque.len() > self.max_entries_per_rule {
                deque.pop_front();
            }
        }
    }

    /// Records for `rule_id`, newest first.
    pub fn query(&self, rule_id: &str, params: &HistoryQuery) -> Vec<RuleExecutionRecord> {
        let guard = self.entries.read().expect("execution history lock poisoned");
        let Some(deque) = guard.get(rule_id) else {
            return Vec::new();
        };

        let limit = params.limit.map(|l| l as usize).unwrap_or(DEFAULT_LIMIT);

        deque
            .iter()
            .rev()
            .filter(|r| params.status.map_or(true, |s| r.status == s))
            .filter(|r| {
                params.since.map_or(true, |s| {
                    r.executed_at
                        .parse::<DateTime<Utc>>()
                        .map_or(false, |at| at >= s)
                })
            })
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn len(&self, rule_id: &str) -> usize {
        let guard = self.entries.read().expect("execution history lock poisoned");
        guard.get(rule_id).map_or(0, VecDeque::len)
    }

    pub fn clear(&self, rule_id: &str) {
        let mut guard = self.entries.write().expect("execution history lock poisoned");
        guard.remove(rule_id);
    }
}

impl Default for ExecutionHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(rule_id: &str, executed_at: &str, status: ExecutionStatus) -> RuleExecutionRecord {
        RuleExecutionRecord {
            rule_id: rule_id.to_string(),
            rule_version: 1,
            input_ref: format!("replay:LUX-0001:{executed_at}"),
            output_event_id: None,
            output_ticket_id: None,
            outcome: "no match".to_string(),
            executed_at: executed_at.to_string(),
            status,
            event_type: None,
            severity: None,
        }
    }

    #[test]
    fn newest_first() {
        let history = ExecutionHistory::new();
        history.record(&[
            record("r1", "2026-02-20T10:00:00.000Z", ExecutionStatus::NoMatch),
            record("r1", "2026-02-20T10:01:00.000Z", ExecutionStatus::Matched),
        ]);
        let got = history.query("r1", &HistoryQuery::default());
        assert_eq!(got.len(), 2);
        assert_eq!(got[0].executed_at, "2026-02-20T10:01:00.000Z");
    }

    #[test]
    fn fifo_eviction() {
        let history = ExecutionHistory::with_max_entries(2);
        for minute in 0..4 {
            let at = format!("2026-02-20T10:0{minute}:00.000Z");
            history.record(&[record("r1", &at, ExecutionStatus::NoMatch)]);
        }
        let got = history.query("r1", &HistoryQuery::default());
        assert_eq!(got.len(), 2);
        assert_eq!(got[1].executed_at, "2026-02-20T10:02:00.000Z");
        assert_eq!(history.len("r1"), 2);
    }

    #[test]
    fn unparseable_since_fails_to_decode() {
        let bad: Result<HistoryQuery, _> =
            serde_json::from_value(serde_json::json!({ "since": "garbage" }));
        assert!(bad.is_err());

        let good: HistoryQuery =
            serde_json::from_value(serde_json::json!({ "since": "2026-02-20T10:00:00Z", "limit": 5 }))
                .unwrap();
        assert_eq!(good.limit, Some(5));
        assert!(good.since.is_some());
    }

    #[test]
    fn status_since_and_limit_filters() {
        let history = ExecutionHistory::new();
        history.record(&[
            record("r1", "2026-02-20T09:00:00.000Z", ExecutionStatus::Matched),
            record("r1", "2026-02-20T10:00:00.000Z", ExecutionStatus::NoMatch),
            record("r1", "2026-02-20T11:00:00.000Z", ExecutionStatus::Matched),
            record("r1", "2026-02-20T12:00:00.000Z", ExecutionStatus::Matched),
        ]);

        let matched = history.query(
            "r1",
            &HistoryQuery { status: Some(ExecutionStatus::Matched), ..Default::default() },
        );
        assert_eq!(matched.len(), 3);

        let recent = history.query(
            "r1",
            &HistoryQuery { since: Some("2026-02-20T10:00:00Z".parse().unwrap()), ..Default::default() },
        );
        assert_eq!(recent.len(), 3);

        let limited = history.query("r1", &HistoryQuery { limit: Some(1), ..Default::default() });
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].executed_at, "2026-02-20T12:00:00.000Z");
    }

    #[test]
    fn per_rule_isolation_and_clear() {
        let history = ExecutionHistory::new();
        history.record(&[
            record("r1", "2026-02-20T10:00:00.000Z", ExecutionStatus::NoMatch),
            record("r2", "2026-02-20T10:00:00.000Z", ExecutionStatus::Faulted),
        ]);
        assert_eq!(history.query("r2", &HistoryQuery::default()).len(), 1);
        history.clear("r1");
        assert!(history.query("r1", &HistoryQuery::default()).is_empty());
        assert_eq!(history.len("r2"), 1);
        assert!(history.query("missing", &HistoryQuery::default()).is_empty());
    }
}
