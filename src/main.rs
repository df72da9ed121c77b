//! UPDOWN — server-authoritative round engine for a timed up/down game.
//!
//! Entry point. Loads configuration, initialises structured logging,
//! builds the round engine, drains settlement notifications, and serves
//! the round API until Ctrl+C.

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use updown::api;
use updown::config;
use updown::engine::settlement::ChannelListener;
use updown::engine::RoundEngine;

const BANNER: &str = r#"
 _   _ ____  ____   _____        ___   _
| | | |  _ \|  _ \ / _ \ \      / / \ | |
| | | | |_) | | | | | | \ \ /\ / /|  \| |
| |_| |  __/| |_| | |_| |\ V  V / | |\  |
 \___/|_|   |____/ \___/  \_/\_/  |_| \_|

  Round engine v0.1.0
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    init_logging();

    let cfg = config::AppConfig::load("config.toml")?;

    println!("{BANNER}");
    info!(
        duration_secs = cfg.round.duration_secs,
        reveal_delay_secs = cfg.round.reveal_delay_secs,
        "UPDOWN starting up"
    );

    // Payouts are handled downstream; here settlements are only logged.
    let (listener, mut settlements) = ChannelListener::new();
    tokio::spawn(async move {
        while let Some(settlement) = settlements.recv().await {
            info!(
                round_id = settlement.round_id,
                outcome = %settlement.outcome,
                settled_at = %settlement.settled_at,
                "Settlement ready for payout"
            );
        }
    });

    let engine = Arc::new(
        RoundEngine::new(cfg.round.clone())?.with_settlement_listener(Arc::new(listener)),
    );

    let addr = cfg.server.socket_addr()?;
    api::serve(engine, addr, shutdown_signal()).await?;

    info!("UPDOWN shut down cleanly.");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received.");
    }
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("updown=info"));

    let json_logging = std::env::var("UPDOWN_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
