//! LuxPulse HTTP API.
//!
//! Routes live under `/api/v1`, with `/health` and the OpenAPI UI at `/docs`
//! outside the prefix.

pub mod api;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
