//! Shared application state handed to every handler.

use std::sync::Arc;

use luxpulse_core::Config;
use luxpulse_rules::{ExecutionHistory, IdStrategy, RuleEngine, RuleSet};
use luxpulse_store::Store;

pub struct AppState {
    pub config: Config,
    pub store: Arc<Store>,
    pub engine: RuleEngine,
    pub history: ExecutionHistory,
}

impl AppState {
    pub fn new(config: Config, store: Arc<Store>) -> Self {
        let ids = if config.worker.deterministic_ids {
            IdStrategy::Derived
        } else {
            IdStrategy::Random
        };
        let history = ExecutionHistory::with_max_entries(config.worker.history_cap);
        Self {
            config,
            store,
            engine: RuleEngine::new(RuleSet::builtin(), ids),
            history,
        }
    }
}
