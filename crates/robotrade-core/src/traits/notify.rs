//! Trade notification trait.

/// Sink for "position changed" signals emitted after every executed trade.
///
/// Notification is fire-and-forget: implementations must not block the
/// trading path, and delivery failures are swallowed.
pub trait TradeNotifier: Send + Sync {
    /// Announce that the position with the given id just traded.
    fn notify(&self, position_id: i64);
}
