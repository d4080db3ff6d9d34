//! Trait definitions for storage, price feed, and notification seams.

mod feed;
mod notify;
mod store;

pub use feed::{PriceFeed, TickStream};
pub use notify::TradeNotifier;
pub use store::PositionStore;
