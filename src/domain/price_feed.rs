//! Latest-value channel for the price board.
//!
//! [`PriceFeed`] wraps a [`tokio::sync::watch`] channel. The broadcast
//! scheduler publishes an immutable [`PriceBoard`] snapshot after every
//! advance; REST handlers and the account service read the latest one.
//! Only the scheduler ever writes.

use std::sync::Arc;

use tokio::sync::watch;

use super::Ticker;
use super::price_simulator::PriceBoard;

/// Read model of the current prices.
#[derive(Debug, Clone)]
pub struct PriceFeed {
    sender: Arc<watch::Sender<Arc<PriceBoard>>>,
}

impl PriceFeed {
    /// Creates a feed holding `initial` as its current value.
    #[must_use]
    pub fn new(initial: PriceBoard) -> Self {
        let (sender, _) = watch::channel(Arc::new(initial));
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Replaces the current board and notifies receivers.
    pub fn publish(&self, board: Arc<PriceBoard>) {
        self.sender.send_replace(board);
    }

    /// Returns the latest published board.
    #[must_use]
    pub fn current(&self) -> Arc<PriceBoard> {
        Arc::clone(&*self.sender.borrow())
    }

    /// Returns `true` if `ticker` is part of the simulated universe.
    #[must_use]
    pub fn tracks(&self, ticker: &Ticker) -> bool {
        self.sender.borrow().contains_key(ticker)
    }

    /// Returns a receiver that observes every subsequent publish.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<PriceBoard>> {
        self.sender.subscribe()
    }
}
