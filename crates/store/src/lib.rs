//! In-memory repository for the LuxPulse estate and the control-action ledger.
//!
//! One [`Store`] is opened at process start, shared as `Arc<Store>` and
//! closed at shutdown.

pub mod derive;
pub mod error;
pub mod inputs;
pub mod ledger;
pub mod seed;
pub mod store;

pub use derive::DerivedOutputs;
pub use error::StoreError;
pub use inputs::*;
pub use ledger::{
    action_types, resolve_correlation_id, ControlActionInput, ControlActionLedger, HistoryFilter,
};
pub use store::{ConfigSnapshot, EvidenceDownload, Store};
