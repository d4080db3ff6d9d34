//! Price feed gateway: pumps one upstream subscription into a channel.

use std::sync::Arc;

use futures::StreamExt;
use robotrade_core::{FeedError, PriceFeed, Tick};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Hand-off capacity between the pump and the fan-out stage. Capacity 1
/// keeps the pump from running ahead of delivery.
const CHANNEL_CAPACITY: usize = 1;

/// Subscribe to `ticker` and pump the subscription into a channel for the
/// rest of the cycle.
///
/// The pump task stops on scope cancellation, upstream end-of-stream, or a
/// stream error; the channel closes in every case. A send already accepted
/// by the channel is not recalled on cancellation.
pub(crate) async fn subscribe(
    feed: &dyn PriceFeed,
    scope: &CancellationToken,
    ticker: &str,
    tasks: &mut JoinSet<()>,
) -> Result<mpsc::Receiver<Arc<Tick>>, FeedError> {
    let mut stream = feed.stream_prices(ticker).await?;
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    let scope = scope.clone();
    let ticker = ticker.to_owned();

    tasks.spawn(async move {
        loop {
            let item = tokio::select! {
                _ = scope.cancelled() => break,
                item = stream.next() => item,
            };
            match item {
                Some(Ok(tick)) => {
                    let sent = tokio::select! {
                        _ = scope.cancelled() => break,
                        sent = tx.send(Arc::new(tick)) => sent,
                    };
                    if sent.is_err() {
                        break;
                    }
                }
                Some(Err(err)) => {
                    warn!(ticker = %ticker, error = %err, "price stream failed");
                    break;
                }
                None => {
                    debug!(ticker = %ticker, "price stream ended");
                    break;
                }
            }
        }
    });

    Ok(rx)
}
