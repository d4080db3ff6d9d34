//! Market price tick.

use serde::{Deserialize, Serialize};

/// One price observation for a ticker: the prices at which the market
/// currently buys from us and sells to us.
///
/// Ticks are fanned out to several traders per ticker, so the engine
/// passes them around as `Arc<Tick>` and never mutates one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    /// Instrument ticker
    pub ticker: String,
    /// Price to buy at
    pub buy_price: f64,
    /// Price to sell at
    pub sell_price: f64,
}

impl Tick {
    /// Create a tick for one instrument.
    pub fn new(ticker: impl Into<String>, buy_price: f64, sell_price: f64) -> Self {
        Self {
            ticker: ticker.into(),
            buy_price,
            sell_price,
        }
    }
}
