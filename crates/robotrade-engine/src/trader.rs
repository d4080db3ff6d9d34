//! Per-position trader: applies the threshold rule to a tick sequence.

use std::sync::Arc;

use robotrade_core::{Position, PositionStore, Tick, TradeNotifier};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// What one trader did over one cycle.
#[derive(Debug, Clone, Copy, Default)]
pub struct TradeOutcome {
    /// Position the trader worked on
    pub position_id: i64,
    /// Trades executed this cycle
    pub trades: u32,
    /// Trades whose persistence failed
    pub persist_failures: u32,
}

/// Trade one position against its tick sequence until the channel closes.
///
/// Buys when looking to buy and the offered buy price drops below the
/// position's buy threshold; sells when holding and the offered sell price
/// rises above the sell threshold. At most one action per tick. Every
/// executed trade is persisted and announced; a persistence failure is
/// logged and trading continues on the in-memory state.
pub(crate) async fn trade(
    mut position: Position,
    mut ticks: mpsc::Receiver<Arc<Tick>>,
    store: Arc<dyn PositionStore>,
    notifier: Arc<dyn TradeNotifier>,
) -> TradeOutcome {
    let mut outcome = TradeOutcome {
        position_id: position.id,
        ..TradeOutcome::default()
    };

    while let Some(tick) = ticks.recv().await {
        if position.is_buying && tick.buy_price < position.buy_price {
            position.buy(tick.buy_price);
            debug!(
                position_id = position.id,
                ticker = %position.ticker,
                price = tick.buy_price,
                "bought"
            );
        } else if !position.is_buying && tick.sell_price > position.sell_price {
            position.sell(tick.sell_price);
            debug!(
                position_id = position.id,
                ticker = %position.ticker,
                price = tick.sell_price,
                "sold"
            );
        } else {
            continue;
        }

        outcome.trades += 1;
        if let Err(err) = store.record_trade(&position).await {
            warn!(position_id = position.id, error = %err, "can't persist trade");
            outcome.persist_failures += 1;
        }
        notifier.notify(position.id);
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use robotrade_core::StoreError;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingStore {
        records: Mutex<Vec<(f64, bool, u32)>>,
        fail: bool,
    }

    #[async_trait]
    impl PositionStore for RecordingStore {
        async fn find_eligible(&self) -> Result<Vec<Position>, StoreError> {
            Ok(Vec::new())
        }

        async fn record_trade(&self, position: &Position) -> Result<(), StoreError> {
            if self.fail {
                return Err(StoreError::Backend("scripted failure".to_owned()));
            }
            self.records.lock().unwrap().push((
                position.fact_yield,
                position.is_buying,
                position.deals_count,
            ));
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        ids: Mutex<Vec<i64>>,
    }

    impl TradeNotifier for RecordingNotifier {
        fn notify(&self, position_id: i64) {
            self.ids.lock().unwrap().push(position_id);
        }
    }

    async fn feed_ticks(ticks: Vec<Tick>) -> mpsc::Receiver<Arc<Tick>> {
        let (tx, rx) = mpsc::channel(ticks.len().max(1));
        for tick in ticks {
            tx.send(Arc::new(tick)).await.unwrap();
        }
        rx
    }

    #[tokio::test]
    async fn test_round_trip_persists_and_notifies() {
        let mut position = Position::new(1, "AAPL", 100.0, 104.0);
        position.id = 11;
        let store = Arc::new(RecordingStore::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let ticks = feed_ticks(vec![
            Tick::new("AAPL", 99.0, 103.0),
            Tick::new("AAPL", 98.0, 105.0),
        ])
        .await;

        let outcome = trade(position, ticks, store.clone(), notifier.clone()).await;

        assert_eq!(outcome.position_id, 11);
        assert_eq!(outcome.trades, 2);
        assert_eq!(outcome.persist_failures, 0);
        let records = store.records.lock().unwrap().clone();
        assert_eq!(records, vec![(-99.0, false, 0), (6.0, true, 1)]);
        assert_eq!(notifier.ids.lock().unwrap().clone(), vec![11, 11]);
    }

    #[tokio::test]
    async fn test_threshold_equality_is_not_a_trigger() {
        let mut position = Position::new(1, "TSLA", 100.0, 104.0);
        position.id = 3;
        let store = Arc::new(RecordingStore::default());
        let notifier = Arc::new(RecordingNotifier::default());

        let ticks = feed_ticks(vec![Tick::new("TSLA", 100.0, 104.0)]).await;
        let outcome = trade(position.clone(), ticks, store.clone(), notifier.clone()).await;
        assert_eq!(outcome.trades, 0);

        position.buy(99.0);
        let ticks = feed_ticks(vec![Tick::new("TSLA", 99.0, 104.0)]).await;
        let outcome = trade(position, ticks, store.clone(), notifier.clone()).await;
        assert_eq!(outcome.trades, 0);

        assert!(store.records.lock().unwrap().is_empty());
        assert!(notifier.ids.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_persist_failure_keeps_trading() {
        let mut position = Position::new(1, "AAPL", 100.0, 104.0);
        position.id = 5;
        let store = Arc::new(RecordingStore {
            fail: true,
            ..RecordingStore::default()
        });
        let notifier = Arc::new(RecordingNotifier::default());
        let ticks = feed_ticks(vec![
            Tick::new("AAPL", 99.0, 103.0),
            Tick::new("AAPL", 98.0, 105.0),
        ])
        .await;

        let outcome = trade(position, ticks, store, notifier.clone()).await;

        assert_eq!(outcome.trades, 2);
        assert_eq!(outcome.persist_failures, 2);
        assert_eq!(notifier.ids.lock().unwrap().clone(), vec![5, 5]);
    }
}
