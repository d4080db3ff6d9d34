//! CSV replay price feed.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use csv::ReaderBuilder;
use futures::stream;
use futures::StreamExt;
use robotrade_core::{FeedError, PriceFeed, Tick, TickStream};
use serde::Deserialize;
use tracing::debug;

const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);

/// CSV record format.
#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(alias = "Ticker", alias = "symbol", alias = "Symbol")]
    ticker: String,
    #[serde(alias = "Buy", alias = "buy", alias = "bid")]
    buy_price: f64,
    #[serde(alias = "Sell", alias = "sell", alias = "ask")]
    sell_price: f64,
}

/// Price feed replaying recorded ticks from a CSV file.
///
/// Every subscription replays the file's ticks for the requested ticker
/// from the beginning, paced by the tick interval, then ends. Useful for
/// paper runs and demos where no live price service is around.
pub struct ReplayPriceFeed {
    ticks: Vec<Tick>,
    tick_interval: Duration,
}

impl ReplayPriceFeed {
    /// Load recorded ticks from a CSV file with a
    /// `ticker,buy_price,sell_price` header.
    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self, FeedError> {
        let file = File::open(path.as_ref())?;
        Ok(Self {
            ticks: read_ticks(file)?,
            tick_interval: DEFAULT_TICK_INTERVAL,
        })
    }

    /// Build a feed from already-loaded ticks.
    pub fn from_ticks(ticks: Vec<Tick>) -> Self {
        Self {
            ticks,
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }

    /// Set the pause between replayed ticks.
    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }
}

#[async_trait]
impl PriceFeed for ReplayPriceFeed {
    async fn stream_prices(&self, ticker: &str) -> Result<TickStream, FeedError> {
        let ticks: Vec<Tick> = self
            .ticks
            .iter()
            .filter(|tick| tick.ticker == ticker)
            .cloned()
            .collect();
        debug!(ticker = %ticker, count = ticks.len(), "replaying recorded ticks");

        let paced = tokio_stream::StreamExt::throttle(stream::iter(ticks), self.tick_interval);
        Ok(paced.map(Ok).boxed())
    }
}

fn read_ticks<R: Read>(reader: R) -> Result<Vec<Tick>, FeedError> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(reader);
    let mut ticks = Vec::new();
    for result in reader.deserialize() {
        let record: CsvRecord = result.map_err(|e| FeedError::Parse(e.to_string()))?;
        ticks.push(Tick::new(record.ticker, record.buy_price, record.sell_price));
    }
    Ok(ticks)
}
