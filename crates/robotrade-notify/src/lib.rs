//! Trade notification sinks.

mod broadcast;

pub use broadcast::{BroadcastNotifier, NoopNotifier};
