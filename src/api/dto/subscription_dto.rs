//! DTOs for subscription management.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for `POST /subscriptions` and `DELETE /subscriptions`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SubscriptionRequest {
    /// Ticker symbols (case-insensitive).
    pub tickers: Vec<String>,
}

/// Current subscription set.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubscriptionResponse {
    /// Subscribed ticker symbols, sorted.
    pub subscribed_tickers: Vec<String>,
}
