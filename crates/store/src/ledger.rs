//! Append-only control-action ledger.
//!
//! Every schedule change or manual override is one [`ControlAction`]. There is
//! no update or delete path; history is the insertion-ordered sequence.

use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use luxpulse_core::{ActorType, ControlAction, JsonObject, TargetType};

use crate::error::{require_min_len, StoreError};
use crate::store::{new_id, Store};

/// Action types the HTTP surface stamps onto ledger writes.
pub mod action_types {
    pub const SCHEDULE_CREATE: &str = "schedule.create";
    pub const SCHEDULE_APPLY: &str = "schedule.apply";
    pub const MANUAL_OVERRIDE: &str = "manual.override";
}

/// A ledger write as submitted by a caller.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlActionInput {
    pub tenant_id: String,
    pub actor_type: ActorType,
    pub actor_id: String,
    pub target_type: TargetType,
    pub target_id: String,
    pub action_type: String,
    pub justification: String,
    pub before_state_json: JsonObject,
    pub after_state_json: JsonObject,
    #[serde(default)]
    pub approval_json: Option<JsonObject>,
}

impl ControlActionInput {
    pub fn validate(&self) -> Result<(), StoreError> {
        require_min_len("actorId", &self.actor_id, 2)?;
        require_min_len("actionType", &self.action_type, 2)?;
        require_min_len("justification", &self.justification, 5)
    }
}

/// Equality filters, AND-combined; `None` matches everything.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryFilter {
    pub tenant_id: Option<String>,
    pub target_type: Option<TargetType>,
    pub target_id: Option<String>,
}

impl HistoryFilter {
    fn matches(&self, action: &ControlAction) -> bool {
        self.tenant_id.as_ref().map_or(true, |t| &action.tenant_id == t)
            && self.target_type.map_or(true, |t| action.target_type == t)
            && self.target_id.as_ref().map_or(true, |t| &action.target_id == t)
    }
}

/// The caller's correlation id when it is non-blank, else a fresh one.
pub fn resolve_correlation_id(header: Option<&str>) -> String {
    match header {
        Some(value) if !value.trim().is_empty() => value.to_string(),
        _ => Uuid::new_v4().to_string(),
    }
}

/// View of the store's ledger table.
pub struct ControlActionLedger<'a> {
    store: &'a Store,
}

impl Store {
    pub fn ledger(&self) -> ControlActionLedger<'_> {
        ControlActionLedger { store: self }
    }
}

impl ControlActionLedger<'_> {
    /// Validate and append. Nothing is written when validation fails.
    pub fn append(
        &self,
        input: ControlActionInput,
        correlation_id: Option<&str>,
    ) -> Result<ControlAction, StoreError> {
        input.validate()?;
        let correlation_id = resolve_correlation_id(correlation_id);

        self.store.write(|t| {
            let action = ControlAction {
                id: new_id(),
                tenant_id: input.tenant_id,
                actor_type: input.actor_type,
                actor_id: input.actor_id,
                target_type: input.target_type,
                target_id: input.target_id,
                action_type: input.action_type,
                justification: input.justification,
                before_state_json: input.before_state_json,
                after_state_json: input.after_state_json,
                approval_json: input.approval_json,
                correlation_id,
                adapter_response_ref: None,
                created_at: Utc::now(),
            };
            info!(
                action_id = %action.id,
                action_type = %action.action_type,
                target = %format!("{}:{}", action.target_type, action.target_id),
                correlation_id = %action.correlation_id,
                "control action appended"
            );
            t.control_actions.push(action.clone());
            Ok(action)
        })
    }

    /// Matching actions in insertion order.
    pub fn history(&self, filter: &HistoryFilter) -> Vec<ControlAction> {
        self.store.read(|t| {
            t.control_actions
                .iter()
                .filter(|a| filter.matches(a))
                .cloned()
                .collect()
        })
    }

    pub fn len(&self) -> usize {
        self.store.read(|t| t.control_actions.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
