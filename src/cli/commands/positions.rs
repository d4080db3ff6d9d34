//! List positions command.

use anyhow::{Context, Result};
use chrono::Utc;
use std::path::Path;

use robotrade_config::load_config;

use super::seed_store;

pub async fn run(config_path: &Path) -> Result<()> {
    let config = load_config(config_path).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    let store = seed_store(&config);
    let now = Utc::now();

    println!("Configured Positions");
    println!("═══════════════════════════════════════════════════════════");
    println!();

    for position in store.find_all() {
        let state = if position.is_eligible(now) {
            "eligible"
        } else {
            "idle"
        };
        println!(
            "  #{:<4} {:<8} owner: {:<4} buy < {:<10.2} sell > {:<10.2} [{}]",
            position.id,
            position.ticker,
            position.owner_id,
            position.buy_price,
            position.sell_price,
            state
        );
    }

    println!();
    println!("Eligible positions trade on the next cycle.");

    Ok(())
}
