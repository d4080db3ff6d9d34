//! Configuration structures.

use chrono::{DateTime, Utc};
use robotrade_core::{EngineError, Position};
use serde::{Deserialize, Serialize};

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub engine: EngineSettings,
    #[serde(default)]
    pub feed: FeedSettings,
    #[serde(default)]
    pub replay: ReplaySettings,
    #[serde(default)]
    pub positions: Vec<PositionSeed>,
}

/// Trading cycle settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSettings {
    pub cycle_timeout_ms: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            cycle_timeout_ms: 3_000,
        }
    }
}

/// Live price feed settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedSettings {
    pub url: String,
    pub connect_timeout_ms: u64,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:9000/prices".to_string(),
            connect_timeout_ms: 5_000,
        }
    }
}

/// Replay feed settings for paper runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplaySettings {
    pub csv: Option<String>,
    pub tick_interval_ms: u64,
}

impl Default for ReplaySettings {
    fn default() -> Self {
        Self {
            csv: None,
            tick_interval_ms: 100,
        }
    }
}

/// One position to seed the store with at startup.
///
/// Plan window bounds are RFC 3339 strings, e.g. `"2026-08-01T00:00:00Z"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionSeed {
    pub owner_id: i64,
    pub ticker: String,
    pub buy_price: f64,
    pub sell_price: f64,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub plan_yield: f64,
    #[serde(default)]
    pub plan_start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub plan_end: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

impl PositionSeed {
    /// Turn the seed into a position template ready for storage.
    pub fn to_position(&self) -> Position {
        let mut position = Position::new(
            self.owner_id,
            self.ticker.clone(),
            self.buy_price,
            self.sell_price,
        );
        position.is_active = self.active;
        position.plan_yield = self.plan_yield;
        position.plan_start = self.plan_start;
        position.plan_end = self.plan_end;
        position
    }
}

impl AppConfig {
    /// Check the configuration for values the engine cannot run with.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.engine.cycle_timeout_ms == 0 {
            return Err(EngineError::Config(
                "engine.cycle_timeout_ms must be positive".to_string(),
            ));
        }
        if self.feed.url.is_empty() {
            return Err(EngineError::Config("feed.url must not be empty".to_string()));
        }
        if !self.feed.url.starts_with("ws://") && !self.feed.url.starts_with("wss://") {
            return Err(EngineError::Config(format!(
                "feed.url must be a ws:// or wss:// endpoint, got '{}'",
                self.feed.url
            )));
        }
        for (index, seed) in self.positions.iter().enumerate() {
            if seed.ticker.is_empty() {
                return Err(EngineError::Config(format!(
                    "positions[{index}]: ticker must not be empty"
                )));
            }
            if seed.buy_price <= 0.0 || seed.sell_price <= 0.0 {
                return Err(EngineError::Config(format!(
                    "positions[{index}]: prices must be positive"
                )));
            }
            if let (Some(start), Some(end)) = (seed.plan_start, seed.plan_end) {
                if start >= end {
                    return Err(EngineError::Config(format!(
                        "positions[{index}]: plan_start must be before plan_end"
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed(ticker: &str, buy_price: f64, sell_price: f64) -> PositionSeed {
        PositionSeed {
            owner_id: 1,
            ticker: ticker.to_string(),
            buy_price,
            sell_price,
            active: true,
            plan_yield: 0.0,
            plan_start: None,
            plan_end: None,
        }
    }

    #[test]
    fn test_defaults_fill_missing_sections() {
        let config: AppConfig = toml::from_str("").unwrap();

        assert_eq!(config.engine.cycle_timeout_ms, 3_000);
        assert_eq!(config.feed.url, "ws://127.0.0.1:9000/prices");
        assert_eq!(config.feed.connect_timeout_ms, 5_000);
        assert_eq!(config.replay.tick_interval_ms, 100);
        assert!(config.replay.csv.is_none());
        assert!(config.positions.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_full_config_parses() {
        let raw = r#"
            [engine]
            cycle_timeout_ms = 1500

            [feed]
            url = "wss://prices.example.com/stream"
            connect_timeout_ms = 2000

            [replay]
            csv = "data/ticks.csv"
            tick_interval_ms = 10

            [[positions]]
            owner_id = 1
            ticker = "AAPL"
            buy_price = 180.0
            sell_price = 185.0

            [[positions]]
            owner_id = 2
            ticker = "TSLA"
            buy_price = 240.0
            sell_price = 248.0
            active = false
            plan_start = "2026-08-01T00:00:00Z"
            plan_end = "2026-09-01T00:00:00Z"
        "#;

        let config: AppConfig = toml::from_str(raw).unwrap();

        assert_eq!(config.engine.cycle_timeout_ms, 1500);
        assert_eq!(config.feed.url, "wss://prices.example.com/stream");
        assert_eq!(config.replay.csv.as_deref(), Some("data/ticks.csv"));
        assert_eq!(config.positions.len(), 2);
        assert!(config.positions[0].active);
        assert!(!config.positions[1].active);
        assert!(config.positions[1].plan_start.is_some());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_seed_becomes_position_template() {
        let mut seed = seed("GOOG", 140.0, 150.0);
        seed.owner_id = 3;
        seed.active = false;
        seed.plan_yield = 12.5;

        let position = seed.to_position();

        assert_eq!(position.owner_id, 3);
        assert_eq!(position.ticker, "GOOG");
        assert_eq!(position.buy_price, 140.0);
        assert_eq!(position.sell_price, 150.0);
        assert_eq!(position.plan_yield, 12.5);
        assert!(!position.is_active);
        assert!(position.is_buying);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.engine.cycle_timeout_ms = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.feed.url = "http://not-a-socket".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.positions.push(seed("", 100.0, 110.0));
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.positions.push(seed("AAPL", 0.0, 110.0));
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        let mut planned = seed("AAPL", 100.0, 110.0);
        planned.plan_start = Some("2026-09-01T00:00:00Z".parse().unwrap());
        planned.plan_end = Some("2026-08-01T00:00:00Z".parse().unwrap());
        config.positions.push(planned);
        assert!(config.validate().is_err());
    }
}
