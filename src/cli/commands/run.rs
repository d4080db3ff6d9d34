//! Live trading command implementation.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

use robotrade_config::load_config;
use robotrade_engine::{Engine, EngineConfig};
use robotrade_feed::WsPriceFeed;
use robotrade_monitor::log_position_events;
use robotrade_notify::BroadcastNotifier;

use super::seed_store;
use crate::cli::RunArgs;

pub async fn run(args: RunArgs, config_path: &Path) -> Result<()> {
    let mut config = load_config(config_path).context("Failed to load configuration")?;
    if let Some(feed_url) = args.feed_url {
        config.feed.url = feed_url;
    }
    if let Some(cycle_timeout_ms) = args.cycle_timeout_ms {
        config.engine.cycle_timeout_ms = cycle_timeout_ms;
    }
    config.validate().context("Invalid configuration")?;

    let store = Arc::new(seed_store(&config));
    let feed = Arc::new(
        WsPriceFeed::new(config.feed.url.clone())
            .with_connect_timeout(Duration::from_millis(config.feed.connect_timeout_ms)),
    );
    let notifier = Arc::new(BroadcastNotifier::new());
    let events = tokio::spawn(log_position_events(notifier.subscribe()));

    let engine = Engine::new(
        store,
        feed,
        notifier,
        EngineConfig {
            cycle_timeout: Duration::from_millis(config.engine.cycle_timeout_ms),
            max_cycles: None,
        },
    );

    info!(
        feed_url = %config.feed.url,
        positions = config.positions.len(),
        "starting trading engine"
    );

    let shutdown = CancellationToken::new();
    let signal = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("shutdown requested");
                shutdown.cancel();
            }
        })
    };

    let completed = engine.run(shutdown).await;
    info!(cycles = completed, "trading engine stopped");

    signal.abort();
    events.abort();
    Ok(())
}
