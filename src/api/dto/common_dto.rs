//! Shared DTO types used across multiple endpoints.

use std::collections::BTreeSet;

use crate::domain::Ticker;

/// Converts a subscription set into its wire form.
#[must_use]
pub fn ticker_strings(tickers: &BTreeSet<Ticker>) -> Vec<String> {
    tickers.iter().map(ToString::to_string).collect()
}
