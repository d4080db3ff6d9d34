//! Trading position entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A trading position: one instrument tracked with a buy/sell threshold pair.
///
/// Storage is the system of record. The engine works on per-cycle copies,
/// and a copy is discarded once its cycle ends; the next cycle re-reads
/// persisted state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Storage-assigned identifier (0 until created)
    pub id: i64,
    /// Owning user
    pub owner_id: i64,
    /// Parent position when this one was created as a favourite copy
    pub parent_id: Option<i64>,
    /// Instrument ticker
    pub ticker: String,
    /// Buy strictly below this price
    pub buy_price: f64,
    /// Sell strictly above this price
    pub sell_price: f64,
    /// Planned activation window start
    pub plan_start: Option<DateTime<Utc>>,
    /// Planned activation window end
    pub plan_end: Option<DateTime<Utc>>,
    /// Planned P&L target (informational)
    pub plan_yield: f64,
    /// Cumulative realized P&L
    pub fact_yield: f64,
    /// Completed buy/sell round-trips
    pub deals_count: u32,
    /// True while looking to buy, false while holding and looking to sell
    pub is_buying: bool,
    /// Explicitly activated for trading
    pub is_active: bool,
    /// Created as a favourite copy of another position
    pub is_favourite: bool,
    /// Last activation time
    pub activated_at: Option<DateTime<Utc>>,
    /// Last deactivation time
    pub deactivated_at: Option<DateTime<Utc>>,
    /// Creation time (stamped by storage)
    pub created_at: DateTime<Utc>,
    /// Soft-delete marker
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Position {
    /// Create a position template for one instrument with its thresholds.
    pub fn new(owner_id: i64, ticker: impl Into<String>, buy_price: f64, sell_price: f64) -> Self {
        Self {
            id: 0,
            owner_id,
            parent_id: None,
            ticker: ticker.into(),
            buy_price,
            sell_price,
            plan_start: None,
            plan_end: None,
            plan_yield: 0.0,
            fact_yield: 0.0,
            deals_count: 0,
            is_buying: true,
            is_active: false,
            is_favourite: false,
            activated_at: None,
            deactivated_at: None,
            created_at: Utc::now(),
            deleted_at: None,
        }
    }

    /// Execute a buy at the given price: P&L pays the price and the
    /// position switches to looking for a sell.
    pub fn buy(&mut self, price: f64) {
        self.fact_yield -= price;
        self.is_buying = false;
    }

    /// Execute a sell at the given price: P&L collects the price, one more
    /// round-trip completes and the position switches back to buying.
    pub fn sell(&mut self, price: f64) {
        self.fact_yield += price;
        self.deals_count += 1;
        self.is_buying = true;
    }

    /// Check whether the position is soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Check whether `now` falls strictly inside the planned window.
    /// False when either bound is unset.
    pub fn in_plan_window(&self, now: DateTime<Utc>) -> bool {
        match (self.plan_start, self.plan_end) {
            (Some(start), Some(end)) => start < now && end > now,
            _ => false,
        }
    }

    /// Check whether the engine should trade this position right now:
    /// not soft-deleted and either inside its planned window or active.
    pub fn is_eligible(&self, now: DateTime<Utc>) -> bool {
        !self.is_deleted() && (self.in_plan_window(now) || self.is_active)
    }

    /// Clone this position as a favourite copy for `owner_id`: linked to
    /// its parent, inactive, with the trading counters reset. The copy has
    /// no id until storage creates it.
    pub fn favourite_copy(&self, owner_id: i64) -> Self {
        let mut copy = self.clone();
        copy.id = 0;
        copy.owner_id = owner_id;
        copy.parent_id = Some(self.id);
        copy.is_favourite = true;
        copy.is_active = false;
        copy.deleted_at = None;
        copy.deals_count = 0;
        copy.fact_yield = 0.0;
        copy
    }
}
