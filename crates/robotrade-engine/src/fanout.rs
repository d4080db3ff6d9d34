//! Tick fan-out: one inbound channel split to every trader of a ticker.

use std::sync::Arc;

use robotrade_core::Tick;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

/// Per-branch buffer. Matches the gateway hand-off: a branch holds at most
/// one undelivered tick.
const BRANCH_CAPACITY: usize = 1;

/// Split `inbound` into `branches` channels, each receiving every tick.
///
/// Delivery is strictly tick-by-tick: every branch receives tick `k`
/// before any branch receives tick `k + 1`, so all traders of one ticker
/// observe identical price sequences. When the inbound channel closes,
/// every branch closes. A branch whose receiver was dropped is skipped
/// without disturbing the others.
pub(crate) fn split(
    mut inbound: mpsc::Receiver<Arc<Tick>>,
    branches: usize,
    tasks: &mut JoinSet<()>,
) -> Vec<mpsc::Receiver<Arc<Tick>>> {
    let mut senders = Vec::with_capacity(branches);
    let mut receivers = Vec::with_capacity(branches);
    for _ in 0..branches {
        let (tx, rx) = mpsc::channel(BRANCH_CAPACITY);
        senders.push(tx);
        receivers.push(rx);
    }

    tasks.spawn(async move {
        while let Some(tick) = inbound.recv().await {
            for sender in &senders {
                let _ = sender.send(Arc::clone(&tick)).await;
            }
        }
    });

    receivers
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_every_branch_sees_every_tick_in_order() {
        let (tx, inbound) = mpsc::channel(1);
        let mut tasks = JoinSet::new();
        let branches = split(inbound, 3, &mut tasks);

        let mut collectors = Vec::new();
        for mut branch in branches {
            collectors.push(tokio::spawn(async move {
                let mut seen = Vec::new();
                while let Some(tick) = branch.recv().await {
                    seen.push(tick.buy_price);
                }
                seen
            }));
        }

        for price in [1.0, 2.0, 3.0] {
            tx.send(Arc::new(Tick::new("AAPL", price, price + 0.5)))
                .await
                .unwrap();
        }
        drop(tx);

        for collector in collectors {
            let seen = timeout(Duration::from_secs(1), collector)
                .await
                .unwrap()
                .unwrap();
            assert_eq!(seen, vec![1.0, 2.0, 3.0]);
        }
    }

    #[tokio::test]
    async fn test_zero_branches_drains_inbound() {
        let (tx, inbound) = mpsc::channel(1);
        let mut tasks = JoinSet::new();
        let branches = split(inbound, 0, &mut tasks);
        assert!(branches.is_empty());

        for price in [10.0, 20.0] {
            tx.send(Arc::new(Tick::new("TSLA", price, price)))
                .await
                .unwrap();
        }
        drop(tx);

        let joined = timeout(Duration::from_secs(1), tasks.join_next()).await.unwrap();
        assert!(joined.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_dropped_branch_does_not_stall_the_others() {
        let (tx, inbound) = mpsc::channel(1);
        let mut tasks = JoinSet::new();
        let mut branches = split(inbound, 2, &mut tasks);
        drop(branches.pop().unwrap());
        let mut keeper = branches.pop().unwrap();

        let collector = tokio::spawn(async move {
            let mut seen = Vec::new();
            while let Some(tick) = keeper.recv().await {
                seen.push(tick.buy_price);
            }
            seen
        });

        for price in [10.0, 20.0] {
            tx.send(Arc::new(Tick::new("GOOG", price, price)))
                .await
                .unwrap();
        }
        drop(tx);

        let seen = timeout(Duration::from_secs(1), collector)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(seen, vec![10.0, 20.0]);
    }
}
