//! Price feed implementations: live WebSocket and CSV replay.

mod replay;
mod ws;

pub use replay::ReplayPriceFeed;
pub use ws::WsPriceFeed;
