//! In-memory position store.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use robotrade_core::{Position, PositionStore, StoreError};

#[derive(Default)]
struct Inner {
    positions: HashMap<i64, Position>,
    next_id: i64,
}

/// Position store backed by a mutex-guarded map.
///
/// Carries the full position lifecycle: creation, listing, activation,
/// favourite copies, and soft deletion. Soft-deleted positions stay in the
/// map but are invisible to every read except the trade write-back.
#[derive(Default)]
pub struct MemoryPositionStore {
    inner: Mutex<Inner>,
}

impl MemoryPositionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a position and return it with its assigned id.
    ///
    /// The store owns the id, the creation time, and the starting trading
    /// phase; whatever the caller put in those fields is overwritten.
    pub fn create(&self, mut position: Position) -> Position {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        position.id = inner.next_id;
        position.is_buying = true;
        position.created_at = Utc::now();
        inner.positions.insert(position.id, position.clone());
        position
    }

    /// Look up one position. Soft-deleted positions are not found.
    pub fn find_by_id(&self, id: i64) -> Result<Position, StoreError> {
        if id <= 0 {
            return Err(StoreError::InvalidId(id));
        }
        let inner = self.inner.lock().unwrap();
        inner
            .positions
            .get(&id)
            .filter(|position| !position.is_deleted())
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    /// List every position.
    pub fn find_all(&self) -> Vec<Position> {
        self.collect(|_| true)
    }

    /// List one user's positions.
    pub fn find_by_owner(&self, owner_id: i64) -> Vec<Position> {
        self.collect(|position| position.owner_id == owner_id)
    }

    /// List positions on one ticker.
    pub fn find_by_ticker(&self, ticker: &str) -> Vec<Position> {
        self.collect(|position| position.ticker == ticker)
    }

    /// List one user's positions on one ticker.
    pub fn find_by_ticker_and_owner(&self, ticker: &str, owner_id: i64) -> Vec<Position> {
        self.collect(|position| position.ticker == ticker && position.owner_id == owner_id)
    }

    /// Mark a position active and stamp the activation time.
    pub fn activate(&self, id: i64) -> Result<Position, StoreError> {
        self.update(id, |position| {
            position.is_active = true;
            position.activated_at = Some(Utc::now());
        })
    }

    /// Mark a position inactive and stamp the deactivation time.
    pub fn deactivate(&self, id: i64) -> Result<Position, StoreError> {
        self.update(id, |position| {
            position.is_active = false;
            position.deactivated_at = Some(Utc::now());
        })
    }

    /// Soft-delete a position. It disappears from reads but keeps its row.
    pub fn soft_delete(&self, id: i64) -> Result<(), StoreError> {
        self.update(id, |position| position.deleted_at = Some(Utc::now()))?;
        Ok(())
    }

    /// Copy an existing position as a favourite for `owner_id`. The copy
    /// starts inactive with fresh trading counters.
    pub fn favourite(&self, parent_id: i64, owner_id: i64) -> Result<Position, StoreError> {
        let copy = self.find_by_id(parent_id)?.favourite_copy(owner_id);
        Ok(self.create(copy))
    }

    fn collect(&self, keep: impl Fn(&Position) -> bool) -> Vec<Position> {
        let inner = self.inner.lock().unwrap();
        let mut positions: Vec<Position> = inner
            .positions
            .values()
            .filter(|position| !position.is_deleted() && keep(position))
            .cloned()
            .collect();
        positions.sort_by_key(|position| position.id);
        positions
    }

    fn update(
        &self,
        id: i64,
        apply: impl FnOnce(&mut Position),
    ) -> Result<Position, StoreError> {
        if id <= 0 {
            return Err(StoreError::InvalidId(id));
        }
        let mut inner = self.inner.lock().unwrap();
        match inner.positions.get_mut(&id) {
            Some(position) if !position.is_deleted() => {
                apply(position);
                Ok(position.clone())
            }
            _ => Err(StoreError::NotFound),
        }
    }
}

#[async_trait]
impl PositionStore for MemoryPositionStore {
    async fn find_eligible(&self) -> Result<Vec<Position>, StoreError> {
        let now = Utc::now();
        let inner = self.inner.lock().unwrap();
        let mut positions: Vec<Position> = inner
            .positions
            .values()
            .filter(|position| position.is_eligible(now))
            .cloned()
            .collect();
        positions.sort_by_key(|position| position.id);
        Ok(positions)
    }

    // The write-back skips the deleted filter: a position deleted
    // mid-cycle still gets its last trades recorded.
    async fn record_trade(&self, position: &Position) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.positions.get_mut(&position.id) {
            Some(stored) => {
                stored.is_buying = position.is_buying;
                stored.deals_count = position.deals_count;
                stored.fact_yield = position.fact_yield;
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }
}
