//! Price feed trait.

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::FeedError;
use crate::types::Tick;

/// Stream of price ticks for one ticker. Ends on upstream close; yields
/// an error item when the upstream fails mid-stream.
pub type TickStream = BoxStream<'static, Result<Tick, FeedError>>;

/// Upstream price source. One subscription serves one ticker; the engine
/// opens a fresh subscription per ticker per cycle and drops it when the
/// cycle ends.
#[async_trait]
pub trait PriceFeed: Send + Sync {
    /// Subscribe to prices for `ticker`.
    async fn stream_prices(&self, ticker: &str) -> Result<TickStream, FeedError>;
}
