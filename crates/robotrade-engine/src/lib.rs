//! Trading engine: repeated bounded cycles of price-driven trading.
//!
//! Each cycle loads the eligible positions, opens one price subscription
//! per distinct ticker, fans ticks out to one trader per position, waits
//! for every trader to finish, and tears the cycle down. The cycle's
//! cancellation scope and hard deadline bound all of it.

mod coordinator;
mod fanout;
mod gateway;
mod trader;

pub use coordinator::{CycleSummary, Engine, EngineConfig};
pub use trader::TradeOutcome;
