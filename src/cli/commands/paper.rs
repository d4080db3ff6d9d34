//! Paper trading command implementation.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

use robotrade_config::{load_config, AppConfig};
use robotrade_core::Tick;
use robotrade_engine::{Engine, EngineConfig};
use robotrade_feed::ReplayPriceFeed;
use robotrade_notify::NoopNotifier;

use super::seed_store;
use crate::cli::PaperArgs;

pub async fn run(args: PaperArgs, config_path: &Path) -> Result<()> {
    let config = load_config(config_path).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    let tick_interval = Duration::from_millis(
        args.tick_interval_ms.unwrap_or(config.replay.tick_interval_ms),
    );
    let csv_path = args
        .data
        .as_deref()
        .or_else(|| config.replay.csv.as_deref().map(Path::new));

    let feed = match csv_path {
        Some(path) => {
            info!(path = %path.display(), "replaying ticks from file");
            ReplayPriceFeed::from_csv(path).context("Failed to load tick data")?
        }
        None => {
            info!("no tick data configured, synthesizing a demo feed");
            ReplayPriceFeed::from_ticks(demo_ticks(&config))
        }
    }
    .with_tick_interval(tick_interval);

    let store = Arc::new(seed_store(&config));
    let engine = Engine::new(
        store.clone(),
        Arc::new(feed),
        Arc::new(NoopNotifier),
        EngineConfig {
            cycle_timeout: Duration::from_millis(config.engine.cycle_timeout_ms),
            max_cycles: Some(args.cycles),
        },
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
    signal.abort();

    println!("Paper run: {} cycles", completed);
    println!("═══════════════════════════════════════════════════════════");
    for position in store.find_all() {
        println!(
            "  #{:<4} {:<8} deals: {:<4} yield: {:+.2}",
            position.id, position.ticker, position.deals_count, position.fact_yield
        );
    }

    Ok(())
}

/// Ticks that walk each configured position through full round trips:
/// a dip below its buy threshold, then a rally above its sell threshold.
fn demo_ticks(config: &AppConfig) -> Vec<Tick> {
    let mut ticks = Vec::new();
    for round in 0..3 {
        let dip = 0.995 - round as f64 * 0.001;
        let rally = 1.005 + round as f64 * 0.001;
        for seed in &config.positions {
            ticks.push(Tick::new(
                seed.ticker.clone(),
                seed.buy_price * dip,
                seed.sell_price * dip,
            ));
            ticks.push(Tick::new(
                seed.ticker.clone(),
                seed.buy_price * rally,
                seed.sell_price * rally,
            ));
        }
    }
    ticks
}
