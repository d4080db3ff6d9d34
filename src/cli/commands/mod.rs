//! CLI command implementations.

pub mod paper;
pub mod positions;
pub mod run;
pub mod validate;

use robotrade_config::AppConfig;
use robotrade_store::MemoryPositionStore;
use tracing::info;

/// Build the in-memory store and seed it with the configured positions.
pub(crate) fn seed_store(config: &AppConfig) -> MemoryPositionStore {
    let store = MemoryPositionStore::new();
    for seed in &config.positions {
        let position = store.create(seed.to_position());
        info!(position_id = position.id, ticker = %position.ticker, "seeded position");
    }
    store
}
