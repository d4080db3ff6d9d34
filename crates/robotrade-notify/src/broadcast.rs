//! Broadcast-channel trade notifier.

use robotrade_core::TradeNotifier;
use tokio::sync::broadcast;

/// Signals buffered per subscriber before the slowest one starts lagging.
const CHANNEL_CAPACITY: usize = 256;

/// Fans position-changed signals out to any number of subscribers.
///
/// Delivery is best-effort: with nobody subscribed the signal is dropped,
/// and a subscriber that falls too far behind loses the oldest signals.
/// The trading path never blocks on a listener.
pub struct BroadcastNotifier {
    sender: broadcast::Sender<i64>,
}

impl BroadcastNotifier {
    /// Create a notifier with no subscribers yet.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Open a subscription to trade signals.
    pub fn subscribe(&self) -> broadcast::Receiver<i64> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl TradeNotifier for BroadcastNotifier {
    fn notify(&self, position_id: i64) {
        // Err means nobody is listening right now.
        let _ = self.sender.send(position_id);
    }
}

/// Notifier that drops every signal.
pub struct NoopNotifier;

impl TradeNotifier for NoopNotifier {
    fn notify(&self, _position_id: i64) {}
}
