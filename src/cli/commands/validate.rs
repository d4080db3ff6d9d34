//! Validate configuration command.

use anyhow::Result;
use robotrade_config::load_config;
use std::path::Path;

pub async fn run(config_path: &Path) -> Result<()> {
    println!("Validating configuration: {:?}", config_path);

    match load_config(config_path) {
        Ok(config) => {
            if let Err(e) = config.validate() {
                println!("Configuration error: {}", e);
                return Err(e.into());
            }
            println!("Configuration is valid!");
            println!();
            println!("Cycle timeout: {} ms", config.engine.cycle_timeout_ms);
            println!("Feed URL: {}", config.feed.url);
            println!("Connect timeout: {} ms", config.feed.connect_timeout_ms);
            println!(
                "Replay file: {}",
                config.replay.csv.as_deref().unwrap_or("(none)")
            );
            println!("Seed positions: {}", config.positions.len());
        }
        Err(e) => {
            println!("Configuration error: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}
