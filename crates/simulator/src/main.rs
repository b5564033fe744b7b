mod client;
mod scenarios;

use std::time::Duration;

use chrono::Utc;
use clap::Parser;
use tracing::{info, warn};

use luxpulse_core::config::load_dotenv;
use luxpulse_core::Config;

use client::ApiClient;

#[derive(Parser)]
#[command(name = "luxpulse-simulator", about = "Posts simulated telemetry and overrides to the LuxPulse API")]
struct Cli {
    /// API base URL including the `/api/v1` prefix (overrides API_BASE_URL).
    #[arg(long)]
    api_base_url: Option<String>,

    /// Milliseconds between ticks (overrides SIM_TICK_MS).
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Run a single tick and exit.
    #[arg(long)]
    once: bool,
}

async fn tick(client: &ApiClient) {
    let now = Utc::now();
    let correlation_id = scenarios::correlation_id(now);

    match client
        .post("/telemetry/ingest", &scenarios::offline_asset(now), &correlation_id)
        .await
    {
        Ok(body) => info!(
            ingested = %body["ingested"],
            correlation_id = %body["correlationId"],
            "telemetry ingest result"
        ),
        Err(e) => warn!(error = %e, "telemetry ingest failed"),
    }

    match client
        .post("/control/overrides", &scenarios::manual_override(), &correlation_id)
        .await
    {
        Ok(body) => info!(
            id = %body["data"]["id"],
            correlation_id = %body["correlationId"],
            "override recorded"
        ),
        Err(e) => warn!(error = %e, "override failed"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    load_dotenv();
    let mut config = Config::from_env();
    if let Some(url) = cli.api_base_url {
        config.simulator.api_base_url = url;
    }
    if let Some(tick_ms) = cli.tick_ms {
        config.simulator.tick_ms = tick_ms;
    }
    config.log_summary();

    let client = ApiClient::new(&config.simulator.api_base_url)?;

    if cli.once {
        tick(&client).await;
        return Ok(());
    }

    let mut interval = tokio::time::interval(Duration::from_millis(config.simulator.tick_ms.max(1)));
    info!(api = %config.simulator.api_base_url, tick_ms = config.simulator.tick_ms, "simulator started");
    loop {
        tokio::select! {
            _ = interval.tick() => tick(&client).await,
            _ = tokio::signal::ctrl_c() => {
                info!("simulator stopping");
                break;
            }
        }
    }
    Ok(())
}
