//! Position storage trait.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::types::Position;

/// Storage seam the trading engine reads positions from and writes
/// trade results back to.
#[async_trait]
pub trait PositionStore: Send + Sync {
    /// Load every position currently eligible for trading: not
    /// soft-deleted and either inside its planned window or explicitly
    /// active.
    async fn find_eligible(&self) -> Result<Vec<Position>, StoreError>;

    /// Persist the result of one executed trade. Only the trading phase,
    /// deal count, and realized P&L are written back; everything else on
    /// the stored row stays untouched.
    ///
    /// # Arguments
    /// * `position` - Working copy carrying the id and the fields to write
    async fn record_trade(&self, position: &Position) -> Result<(), StoreError>;
}
