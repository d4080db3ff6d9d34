//! Domain types for the trading engine.

mod position;
mod tick;

pub use position::Position;
pub use tick::Tick;
