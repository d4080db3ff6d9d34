//! Logging setup and trade event monitoring.

mod events;
mod logging;

pub use events::log_position_events;
pub use logging::setup_logging;
