//! rules-worker: periodic replay of the built-in fixture.
//!
//! Each tick replays `offline-event-ticket` with the current time, logs the
//! records as JSON and logs the evidence manifest checksums for the demo
//! site. Queryable execution history lives in the API server.

use std::time::Duration;

use chrono::Utc;
use clap::Parser;
use tracing::{info, warn};

use luxpulse_core::config::{load_dotenv, Config};
use luxpulse_core::evidence::{build_evidence_manifest, EvidenceScope};
use luxpulse_rules::{fixtures, replay_fixture, IdStrategy, RuleSet};

// ── CLI ─────────────────────────────────────────────────────────────

/// Rules worker: replays fixtures through the rule engine on a fixed interval.
#[derive(Parser, Debug)]
#[command(name = "rules-worker", version, about)]
struct Cli {
    /// Seconds between ticks.
    #[arg(long, env = "WORKER_TICK_SECS")]
    tick_secs: Option<u64>,

    /// Derive event/ticket ids from the input instead of generating them.
    /// Also enabled by `RULES_DETERMINISTIC_IDS=true`.
    #[arg(long)]
    deterministic_ids: bool,

    /// Run a single tick and exit.
    #[arg(long)]
    once: bool,
}

// ── Worker ──────────────────────────────────────────────────────────

struct RulesWorker {
    rules: RuleSet,
    ids: IdStrategy,
}

impl RulesWorker {
    fn tick(&self) -> anyhow::Result<()> {
        let input = fixtures::offline_event_ticket(Utc::now());
        let replay = replay_fixture(&self.rules, fixtures::OFFLINE_EVENT_TICKET, input, self.ids);

        let matched = replay.result.iter().filter(|r| r.is_match()).count();
        info!(
            fixture = %replay.fixture,
            records = replay.result.len(),
            matched,
            "deterministic replay"
        );
        info!("{}", serde_json::to_string_pretty(&replay.result)?);

        let manifest = build_evidence_manifest(&EvidenceScope {
            tenant_id: "demo-tenant".to_string(),
            site_id: "site-london-west".to_string(),
            period_start: "2026-02-15T00:00:00.000Z".to_string(),
            period_end: "2026-02-22T23:59:59.999Z".to_string(),
        });
        info!(
            "evidence manifest checksums {}",
            serde_json::to_string_pretty(&manifest.checksums)?
        );
        Ok(())
    }
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    load_dotenv();
    let cli = Cli::parse();
    let mut config = Config::from_env();
    if let Some(tick_secs) = cli.tick_secs {
        config.worker.tick_secs = tick_secs;
    }
    if cli.deterministic_ids {
        config.worker.deterministic_ids = true;
    }
    config.log_summary();

    let worker = RulesWorker {
        rules: RuleSet::builtin(),
        ids: if config.worker.deterministic_ids {
            IdStrategy::Derived
        } else {
            IdStrategy::Random
        },
    };

    if cli.once {
        return worker.tick();
    }

    // First tick fires immediately.
    let mut interval = tokio::time::interval(Duration::from_secs(config.worker.tick_secs.max(1)));
    info!(tick_secs = config.worker.tick_secs, "rules-worker starting");

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if let Err(e) = worker.tick() {
                    warn!(error = %e, "worker tick failed");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("rules-worker shutting down");
                break;
            }
        }
    }

    info!("rules-worker exited cleanly");
    Ok(())
}
