//! Core types and traits for the robotrade engine.
//!
//! This crate provides the foundational building blocks including:
//! - Domain types (Position, Tick)
//! - Collaborator traits for storage, price streaming and notification
//! - The engine error taxonomy

pub mod types;
pub mod traits;
pub mod error;

pub use error::{EngineError, EngineResult, FeedError, StoreError};
pub use types::*;
pub use traits::*;
