//! Shared application state injected into all Axum handlers.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::{ConnectionRegistry, PriceFeed};
use crate::service::AccountService;

/// Per-connection streaming limits.
#[derive(Debug, Clone, Copy)]
pub struct StreamSettings {
    /// Capacity of each connection's outbound update queue.
    pub outbound_queue_capacity: usize,
    /// Per-frame write timeout.
    pub send_timeout: Duration,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            outbound_queue_capacity: 64,
            send_timeout: Duration::from_secs(2),
        }
    }
}

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Account service for registration, login and subscriptions.
    pub account_service: Arc<AccountService>,
    /// Live streaming connections.
    pub registry: Arc<ConnectionRegistry>,
    /// Latest prices.
    pub feed: PriceFeed,
    /// Streaming limits.
    pub stream: StreamSettings,
}
