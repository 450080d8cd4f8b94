//! Periodic price tick and per-connection filtered fan-out.
//!
//! Every tick runs, in order:
//!
//! 1. [`PriceSimulator::advance`]
//! 2. publish the new board to the [`PriceFeed`]
//! 3. [`ConnectionRegistry::snapshot`]
//! 4. for each connection, read its owner's subscription set from the
//!    [`UserStore`] and queue one [`PriceUpdate`] per subscribed ticker
//!    that has a price
//!
//! Delivery never waits: updates go into each connection's bounded queue
//! with `try_send`, so a slow client only loses its own updates. Nothing
//! in a tick can fail the scheduler.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::connection::ConnectionHandle;
use super::price_simulator::{PriceBoard, PriceSimulator, PriceUpdate};
use super::{ConnectionRegistry, PriceFeed, UserStore};
use crate::error::SendFailure;

/// Default time between ticks.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Outcome of one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Tick sequence number, starting at 1.
    pub tick: u64,
    /// Connections in the snapshot.
    pub connections: usize,
    /// Updates queued successfully.
    pub delivered: usize,
    /// Updates dropped because a queue was full or closed.
    pub dropped: usize,
    /// Connections skipped because they were closed or had no account.
    pub skipped: usize,
}

/// Drives the price simulation and fans updates out to subscribers.
#[derive(Debug)]
pub struct BroadcastScheduler {
    simulator: PriceSimulator,
    registry: Arc<ConnectionRegistry>,
    store: Arc<UserStore>,
    feed: PriceFeed,
    period: Duration,
    ticks: u64,
}

impl BroadcastScheduler {
    /// Creates a scheduler. It does nothing until [`tick`](Self::tick) is
    /// called or it is [`spawn`](Self::spawn)ed.
    #[must_use]
    pub fn new(
        simulator: PriceSimulator,
        registry: Arc<ConnectionRegistry>,
        store: Arc<UserStore>,
        feed: PriceFeed,
        period: Duration,
    ) -> Self {
        Self {
            simulator,
            registry,
            store,
            feed,
            period: if period.is_zero() {
                DEFAULT_TICK_INTERVAL
            } else {
                period
            },
            ticks: 0,
        }
    }

    /// Returns the tick period.
    #[must_use]
    pub const fn period(&self) -> Duration {
        self.period
    }

    /// Returns the simulator's current board.
    #[must_use]
    pub const fn board(&self) -> &PriceBoard {
        self.simulator.board()
    }

    /// Runs one full tick: advance, publish, snapshot, fan out.
    pub async fn tick(&mut self) -> TickReport {
        self.ticks = self.ticks.saturating_add(1);
        self.simulator.advance();

        let board = Arc::new(self.simulator.board().clone());
        self.feed.publish(Arc::clone(&board));

        let connections = self.registry.snapshot().await;
        let mut report = fan_out(&board, &connections, &self.store).await;
        report.tick = self.ticks;
        report
    }

    /// Starts ticking every period on the current runtime.
    ///
    /// The first tick fires one period after the call. Missed periods are
    /// skipped rather than replayed. Dropping the returned handle stops the
    /// scheduler as well.
    #[must_use]
    pub fn spawn(mut self) -> SchedulerHandle {
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let join = tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first interval tick completes immediately.
            interval.tick().await;
            tracing::info!(period_ms = self.period.as_millis(), "broadcast scheduler started");

            loop {
                tokio::select! {
                    biased;
                    _ = &mut stop_rx => break,
                    _ = interval.tick() => {
                        let report = self.tick().await;
                        tracing::debug!(
                            tick = report.tick,
                            connections = report.connections,
                            delivered = report.delivered,
                            dropped = report.dropped,
                            skipped = report.skipped,
                            "tick complete"
                        );
                    }
                }
            }

            tracing::info!(ticks = self.ticks, "broadcast scheduler stopped");
            self.ticks
        });

        SchedulerHandle {
            stop: Some(stop_tx),
            join,
        }
    }
}

/// Delivers `board` to every connection in `connections`, filtered by the
/// owner's subscription set at the moment of the lookup.
///
/// Failures stay local to the connection they happen on.
pub async fn fan_out(
    board: &PriceBoard,
    connections: &[ConnectionHandle],
    store: &UserStore,
) -> TickReport {
    let mut report = TickReport {
        connections: connections.len(),
        ..TickReport::default()
    };

    for conn in connections {
        if !conn.is_open() {
            report.skipped += 1;
            continue;
        }
        let Some(tickers) = store.subscribed_tickers(conn.token()).await else {
            tracing::debug!(connection = %conn.id(), "no account for token; skipping");
            report.skipped += 1;
            continue;
        };

        for ticker in tickers {
            let Some(&price) = board.get(&ticker) else {
                continue;
            };
            match conn.try_deliver(PriceUpdate { ticker, price }) {
                Ok(()) => report.delivered += 1,
                Err(SendFailure::Backpressure) => {
                    report.dropped += 1;
                    tracing::debug!(connection = %conn.id(), "outbound queue full; update dropped");
                }
                Err(SendFailure::Closed) => {
                    report.dropped += 1;
                    tracing::debug!(connection = %conn.id(), "connection closed mid-tick");
                    break;
                }
            }
        }
    }

    report
}

/// Handle to a running scheduler task.
#[derive(Debug)]
pub struct SchedulerHandle {
    stop: Option<oneshot::Sender<()>>,
    join: JoinHandle<u64>,
}

impl SchedulerHandle {
    /// Returns `true` once the scheduler task has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Stops the scheduler and waits for it, returning the ticks it ran.
    pub async fn stop(mut self) -> u64 {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        match (&mut self.join).await {
            Ok(ticks) => ticks,
            Err(e) => {
                tracing::error!(error = %e, "broadcast scheduler task failed");
                0
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::collections::BTreeSet;

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use tokio::sync::mpsc;

    use super::*;
    use crate::domain::account::Account;
    use crate::domain::price_simulator::SimulatorSettings;
    use crate::domain::{SessionToken, Ticker};

    fn ticker(s: &str) -> Ticker {
        let Ok(t) = Ticker::parse(s) else {
            panic!("valid ticker");
        };
        t
    }

    fn tickers(symbols: &[&str]) -> BTreeSet<Ticker> {
        symbols.iter().map(|s| ticker(s)).collect()
    }

    struct Harness {
        scheduler: BroadcastScheduler,
        registry: Arc<ConnectionRegistry>,
        store: Arc<UserStore>,
    }

    fn harness(settings: SimulatorSettings, period: Duration) -> Harness {
        let simulator = PriceSimulator::with_seed(
            [
                (ticker("GOOG"), 140.0),
                (ticker("TSLA"), 250.0),
                (ticker("AMZN"), 180.0),
            ],
            settings,
            7,
        );
        let registry = Arc::new(ConnectionRegistry::new());
        let store = Arc::new(UserStore::new());
        let feed = PriceFeed::new(simulator.board().clone());
        let scheduler = BroadcastScheduler::new(
            simulator,
            Arc::clone(&registry),
            Arc::clone(&store),
            feed,
            period,
        );
        Harness {
            scheduler,
            registry,
            store,
        }
    }

    async fn account_with(store: &UserStore, email: &str, symbols: &[&str]) -> SessionToken {
        let mut account = Account::new(email.to_string(), "pw".to_string());
        account.subscribed_tickers = tickers(symbols);
        let token = account.session_token.clone();
        if store.insert(account).await.is_err() {
            panic!("insert failed");
        }
        token
    }

    fn drain(rx: &mut mpsc::Receiver<PriceUpdate>) -> Vec<PriceUpdate> {
        let mut out = Vec::new();
        while let Ok(update) = rx.try_recv() {
            out.push(update);
        }
        out
    }

    fn symbols(updates: &[PriceUpdate]) -> BTreeSet<String> {
        updates.iter().map(|u| u.ticker.to_string()).collect()
    }

    #[tokio::test]
    async fn connection_receives_only_subscribed_tickers() {
        let mut h = harness(SimulatorSettings::default(), DEFAULT_TICK_INTERVAL);
        let token = account_with(&h.store, "a@example.com", &["GOOG", "TSLA"]).await;
        let (conn, mut rx) = ConnectionHandle::new(token, 16);
        h.registry.register(conn).await;

        for _ in 0..3 {
            let report = h.scheduler.tick().await;
            assert_eq!(report.delivered, 2);
            let updates = drain(&mut rx);
            assert_eq!(updates.len(), 2);
            assert_eq!(symbols(&updates), tickers_as_strings(&["GOOG", "TSLA"]));
            for update in &updates {
                assert_eq!(h.scheduler.board().get(&update.ticker), Some(&update.price));
            }
        }
    }

    fn tickers_as_strings(symbols: &[&str]) -> BTreeSet<String> {
        symbols.iter().map(|s| (*s).to_string()).collect()
    }

    #[tokio::test]
    async fn unsubscribe_between_ticks_is_visible_next_tick() {
        let mut h = harness(SimulatorSettings::default(), DEFAULT_TICK_INTERVAL);
        let token = account_with(&h.store, "a@example.com", &["GOOG", "TSLA"]).await;
        let (conn, mut rx) = ConnectionHandle::new(token.clone(), 16);
        h.registry.register(conn).await;

        h.scheduler.tick().await;
        assert_eq!(drain(&mut rx).len(), 2);

        let Some(mut account) = h.store.find_by_session_token(&token).await else {
            panic!("account missing");
        };
        account.subscribed_tickers.remove(&ticker("TSLA"));
        h.store.save(account).await;

        h.scheduler.tick().await;
        let updates = drain(&mut rx);
        assert_eq!(symbols(&updates), tickers_as_strings(&["GOOG"]));
    }

    #[tokio::test]
    async fn no_matching_tickers_means_no_message() {
        let mut h = harness(SimulatorSettings::default(), DEFAULT_TICK_INTERVAL);
        let token = account_with(&h.store, "a@example.com", &[]).await;
        let (conn, mut rx) = ConnectionHandle::new(token, 16);
        h.registry.register(conn).await;

        let report = h.scheduler.tick().await;
        assert_eq!(report.delivered, 0);
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn untracked_subscription_is_ignored() {
        let mut h = harness(SimulatorSettings::default(), DEFAULT_TICK_INTERVAL);
        let token = account_with(&h.store, "a@example.com", &["GOOG", "NFLX"]).await;
        let (conn, mut rx) = ConnectionHandle::new(token, 16);
        h.registry.register(conn).await;

        h.scheduler.tick().await;
        assert_eq!(symbols(&drain(&mut rx)), tickers_as_strings(&["GOOG"]));
    }

    #[tokio::test]
    async fn orphaned_and_closed_connections_are_skipped() {
        let mut h = harness(SimulatorSettings::default(), DEFAULT_TICK_INTERVAL);
        let (orphan, _orphan_rx) = ConnectionHandle::new(SessionToken::from_raw("gone"), 16);
        h.registry.register(orphan).await;

        let token = account_with(&h.store, "a@example.com", &["GOOG"]).await;
        let (closed, _closed_rx) = ConnectionHandle::new(token, 16);
        closed.close(crate::domain::CloseReason::TransportClosed);
        h.registry.register(closed).await;

        let report = h.scheduler.tick().await;
        assert_eq!(report.connections, 2);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.delivered, 0);
    }

    #[tokio::test]
    async fn slow_client_does_not_block_others() {
        let mut h = harness(SimulatorSettings::default(), DEFAULT_TICK_INTERVAL);
        let slow_token = account_with(&h.store, "slow@example.com", &["GOOG", "TSLA"]).await;
        let fast_token = account_with(&h.store, "fast@example.com", &["GOOG", "TSLA"]).await;

        let (slow, _slow_rx) = ConnectionHandle::new(slow_token, 1);
        let (fast, mut fast_rx) = ConnectionHandle::new(fast_token, 16);
        h.registry.register(slow).await;
        h.registry.register(fast).await;

        let report = h.scheduler.tick().await;
        assert_eq!(report.delivered, 3);
        assert_eq!(report.dropped, 1);
        assert_eq!(drain(&mut fast_rx).len(), 2);
    }

    #[tokio::test]
    async fn dropped_receiver_is_isolated() {
        let mut h = harness(SimulatorSettings::default(), DEFAULT_TICK_INTERVAL);
        let dead_token = account_with(&h.store, "dead@example.com", &["GOOG", "TSLA"]).await;
        let live_token = account_with(&h.store, "live@example.com", &["AMZN"]).await;

        let (dead, dead_rx) = ConnectionHandle::new(dead_token, 16);
        let (live, mut live_rx) = ConnectionHandle::new(live_token, 16);
        h.registry.register(dead).await;
        h.registry.register(live).await;
        drop(dead_rx);

        let report = h.scheduler.tick().await;
        assert_eq!(report.delivered, 1);
        assert_eq!(symbols(&drain(&mut live_rx)), tickers_as_strings(&["AMZN"]));
    }

    #[tokio::test]
    async fn tick_publishes_to_feed() {
        let h = harness(SimulatorSettings::default(), DEFAULT_TICK_INTERVAL);
        let mut scheduler = h.scheduler;
        let feed = scheduler.feed.clone();
        let mut rx = feed.subscribe();
        scheduler.tick().await;
        assert!(rx.changed().await.is_ok());
        assert_eq!(*feed.current(), *scheduler.board());
    }

    #[tokio::test(start_paused = true)]
    async fn spawned_scheduler_ticks_on_period_and_stops() {
        let h = harness(SimulatorSettings::default(), Duration::from_secs(1));
        let token = account_with(&h.store, "a@example.com", &["GOOG", "TSLA"]).await;
        let (conn, mut rx) = ConnectionHandle::new(token, 64);
        h.registry.register(conn).await;

        let handle = h.scheduler.spawn();
        tokio::time::sleep(Duration::from_millis(3_500)).await;
        let ticks = handle.stop().await;

        assert_eq!(ticks, 3);
        assert_eq!(drain(&mut rx).len(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn churn_during_ticks_never_faults() {
        let h = harness(SimulatorSettings::default(), Duration::from_secs(1));
        let registry = Arc::clone(&h.registry);
        let store = Arc::clone(&h.store);

        let mut tokens = Vec::new();
        for i in 0..100 {
            let email = format!("user{i}@example.com");
            tokens.push(account_with(&store, &email, &["GOOG", "AMZN"]).await);
        }

        let handle = h.scheduler.spawn();

        let mut tasks = Vec::new();
        for (i, token) in tokens.into_iter().enumerate() {
            let registry = Arc::clone(&registry);
            tasks.push(tokio::spawn(async move {
                let mut rng = StdRng::seed_from_u64(i as u64);
                // A token owns at most one registry entry; track whether ours is live.
                let mut present = false;
                for _ in 0..5 {
                    let (conn, _rx) = ConnectionHandle::new(token.clone(), 8);
                    let id = conn.id();
                    registry.register(conn).await;
                    present = true;
                    let hold = rng.random_range(0..2_000u64);
                    tokio::time::sleep(Duration::from_millis(hold)).await;
                    if rng.random_bool(0.7) && registry.remove_connection(&token, id).await {
                        present = false;
                    }
                }
                usize::from(present)
            }));
        }

        let mut expected = 0;
        for task in tasks {
            let Ok(live) = task.await else {
                panic!("churn task panicked");
            };
            expected += live;
        }

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(!handle.is_finished());
        let ticks = handle.stop().await;
        assert!(ticks >= 10);

        assert_eq!(registry.len().await, expected);
    }
}
