use std::env;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_u16(profile: &str, key: &str, default: u16) -> u16 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_u64(profile: &str, key: &str, default: u64) -> u64 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_bool(profile: &str, key: &str, default: bool) -> bool {
    match profiled_env_opt(profile, key) {
        Some(v) => matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        None => default,
    }
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub server: ServerConfig,
    pub worker: WorkerConfig,
    pub simulator: SimulatorConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `LUXPULSE_PROFILE`. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("LUXPULSE_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            server: ServerConfig::from_env_profiled(p),
            worker: WorkerConfig::from_env_profiled(p),
            simulator: SimulatorConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!(
            "  server:     {}:{} (cors={}, seed={})",
            self.server.host,
            self.server.port,
            self.server.cors_origin,
            self.server.seed_demo_data
        );
        tracing::info!(
            "  worker:     tick={}s, history_cap={}, deterministic_ids={}",
            self.worker.tick_secs,
            self.worker.history_cap,
            self.worker.deterministic_ids
        );
        tracing::info!(
            "  simulator:  api={}, tick={}ms",
            self.simulator.api_base_url,
            self.simulator.tick_ms
        );
    }
}

// ── Server ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
    /// Seed the store with the demo tenant, sites, zones and assets at startup.
    pub seed_demo_data: bool,
}

impl ServerConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            host: profiled_env_or(p, "HOST", "0.0.0.0"),
            port: profiled_env_u16(p, "PORT", 4000),
            cors_origin: profiled_env_or(p, "CORS_ORIGIN", "*"),
            seed_demo_data: profiled_env_bool(p, "SEED_DEMO_DATA", true),
        }
    }
}

// ── Worker ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    pub tick_secs: u64,
    /// Execution records kept per rule before the oldest are evicted.
    pub history_cap: usize,
    /// Derive event/ticket ids from the input instead of generating them.
    pub deterministic_ids: bool,
}

impl WorkerConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            tick_secs: profiled_env_u64(p, "WORKER_TICK_SECS", 60),
            history_cap: profiled_env_u64(p, "WORKER_HISTORY_CAP", 500) as usize,
            deterministic_ids: profiled_env_bool(p, "RULES_DETERMINISTIC_IDS", false),
        }
    }
}

// ── Simulator ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatorConfig {
    pub api_base_url: String,
    pub tick_ms: u64,
}

impl SimulatorConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            api_base_url: profiled_env_or(p, "API_BASE_URL", "http://localhost:4000/api/v1"),
            tick_ms: profiled_env_u64(p, "SIM_TICK_MS", 45_000),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiled_lookup_prefers_prefixed_key() {
        env::set_var("LPTEST_WORKER_TICK_SECS", "5");
        env::set_var("WORKER_TICK_SECS_UNUSED", "1");
        let cfg = Config::for_profile("lptest");
        assert_eq!(cfg.profile, "LPTEST");
        assert_eq!(cfg.worker.tick_secs, 5);
        env::remove_var("LPTEST_WORKER_TICK_SECS");
        env::remove_var("WORKER_TICK_SECS_UNUSED");
    }

    #[test]
    fn bool_parsing_accepts_common_spellings() {
        env::set_var("BOOLTEST_RULES_DETERMINISTIC_IDS", "Yes");
        assert!(profiled_env_bool("BOOLTEST", "RULES_DETERMINISTIC_IDS", false));
        env::set_var("BOOLTEST_RULES_DETERMINISTIC_IDS", "0");
        assert!(!profiled_env_bool("BOOLTEST", "RULES_DETERMINISTIC_IDS", true));
        env::remove_var("BOOLTEST_RULES_DETERMINISTIC_IDS");
    }

    #[test]
    fn profile_label_defaults() {
        let cfg = Config::for_profile("");
        assert_eq!(cfg.profile_label(), "default");
    }
}
