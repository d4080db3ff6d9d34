//! Cycle coordinator: drives bounded trading cycles end to end.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use robotrade_core::{Position, PositionStore, PriceFeed, Tick, TradeNotifier};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{fanout, gateway, trader};

/// Engine tuning knobs.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Hard deadline for one trading cycle
    pub cycle_timeout: Duration,
    /// Stop after this many cycles; `None` runs until shutdown
    pub max_cycles: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cycle_timeout: Duration::from_secs(3),
            max_cycles: None,
        }
    }
}

/// What one cycle did.
#[derive(Debug, Clone, Copy, Default)]
pub struct CycleSummary {
    /// Cycle sequence number, starting at 1
    pub cycle: u64,
    /// Positions traded this cycle
    pub positions: usize,
    /// Distinct tickers subscribed to
    pub tickers: usize,
    /// Trades executed across all traders
    pub trades: u64,
    /// Trades whose persistence failed
    pub persist_failures: u64,
    /// Wall-clock cycle duration
    pub elapsed: Duration,
}

/// The trading engine.
///
/// Runs repeated fixed-length cycles. Each cycle re-reads eligible
/// positions from storage, so activations, deactivations, and edits made
/// between cycles are picked up without restarting anything.
pub struct Engine {
    store: Arc<dyn PositionStore>,
    feed: Arc<dyn PriceFeed>,
    notifier: Arc<dyn TradeNotifier>,
    config: EngineConfig,
}

impl Engine {
    /// Create an engine over the given storage, price feed, and notifier.
    pub fn new(
        store: Arc<dyn PositionStore>,
        feed: Arc<dyn PriceFeed>,
        notifier: Arc<dyn TradeNotifier>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            feed,
            notifier,
            config,
        }
    }

    /// Run cycles until `shutdown` fires or the configured cycle limit is
    /// reached. Returns the number of completed cycles.
    pub async fn run(&self, shutdown: CancellationToken) -> u64 {
        let mut completed = 0;
        while !shutdown.is_cancelled() {
            if let Some(limit) = self.config.max_cycles {
                if completed >= limit {
                    break;
                }
            }
            let summary = self.run_cycle(completed + 1, &shutdown).await;
            completed = summary.cycle;
            info!(
                cycle = summary.cycle,
                positions = summary.positions,
                tickers = summary.tickers,
                trades = summary.trades,
                persist_failures = summary.persist_failures,
                elapsed_ms = summary.elapsed.as_millis() as u64,
                "cycle complete"
            );
        }
        completed
    }

    /// Run one trading cycle under a fresh cancellation scope.
    ///
    /// The scope is a child of `shutdown` and is cancelled by the cycle
    /// deadline, so a cycle never outlives the timeout by more than the
    /// in-flight trade work it still has to drain.
    pub async fn run_cycle(&self, cycle: u64, shutdown: &CancellationToken) -> CycleSummary {
        let started = Instant::now();
        let scope = shutdown.child_token();

        // The deadline covers position loading too, so arm it first.
        let timer = {
            let scope = scope.clone();
            let deadline = self.config.cycle_timeout;
            tokio::spawn(async move {
                tokio::time::sleep(deadline).await;
                scope.cancel();
            })
        };

        let positions = tokio::select! {
            _ = scope.cancelled() => {
                debug!(cycle, "cycle scope cancelled while loading positions");
                Vec::new()
            }
            found = self.store.find_eligible() => match found {
                Ok(positions) => positions,
                Err(err) => {
                    warn!(cycle, error = %err, "can't load positions, skipping cycle");
                    Vec::new()
                }
            },
        };

        let groups = group_by_ticker(positions);
        let mut summary = CycleSummary {
            cycle,
            positions: groups.values().map(Vec::len).sum(),
            tickers: groups.len(),
            ..CycleSummary::default()
        };

        let mut plumbing = JoinSet::new();
        let mut traders = JoinSet::new();

        for (ticker, group) in groups {
            // Race the subscription against the scope so a hung connect
            // cannot push the cycle past its deadline.
            let subscribed = tokio::select! {
                _ = scope.cancelled() => Ok(closed_channel()),
                subscribed = gateway::subscribe(self.feed.as_ref(), &scope, &ticker, &mut plumbing) => subscribed,
            };
            let inbound = match subscribed {
                Ok(inbound) => inbound,
                Err(err) => {
                    warn!(ticker = %ticker, error = %err, "can't subscribe, ticker gets no prices this cycle");
                    closed_channel()
                }
            };
            let branches = fanout::split(inbound, group.len(), &mut plumbing);
            for (position, ticks) in group.into_iter().zip(branches) {
                traders.spawn(trader::trade(
                    position,
                    ticks,
                    Arc::clone(&self.store),
                    Arc::clone(&self.notifier),
                ));
            }
        }

        if summary.positions == 0 {
            // Nothing to trade: wait the cycle out rather than spin.
            scope.cancelled().await;
        }

        while let Some(joined) = traders.join_next().await {
            match joined {
                Ok(outcome) => {
                    summary.trades += u64::from(outcome.trades);
                    summary.persist_failures += u64::from(outcome.persist_failures);
                }
                Err(err) => warn!(error = %err, "trader task failed"),
            }
        }

        scope.cancel();
        while plumbing.join_next().await.is_some() {}
        timer.abort();

        summary.elapsed = started.elapsed();
        summary
    }
}

/// Group positions by ticker. A position without a ticker cannot be
/// subscribed for, so it sits this cycle out.
fn group_by_ticker(positions: Vec<Position>) -> HashMap<String, Vec<Position>> {
    let mut groups: HashMap<String, Vec<Position>> = HashMap::new();
    for position in positions {
        if position.ticker.is_empty() {
            warn!(position_id = position.id, "position has no ticker, skipping");
            continue;
        }
        groups
            .entry(position.ticker.clone())
            .or_default()
            .push(position);
    }
    groups
}

/// A receiver whose channel is already closed. Stands in for a ticker
/// whose subscription could not be opened.
fn closed_channel() -> mpsc::Receiver<Arc<Tick>> {
    let (_, rx) = mpsc::channel(1);
    rx
}
