//! Trade event logging.

use tokio::sync::broadcast;
use tracing::{info, warn};

/// Log every trade signal arriving on the subscription until the notifier
/// goes away. Meant to run as its own task next to the engine.
pub async fn log_position_events(mut events: broadcast::Receiver<i64>) {
    loop {
        match events.recv().await {
            Ok(position_id) => info!(position_id, "position traded"),
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                warn!(missed, "trade events dropped, listener fell behind");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
