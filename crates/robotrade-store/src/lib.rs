//! Position storage backends.

mod memory;

pub use memory::MemoryPositionStore;
