//! DTOs for the price board.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::PriceBoard;
use crate::domain::price_simulator::round_cents;

/// One ticker and its current price.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PriceDto {
    /// Ticker symbol.
    pub ticker: String,
    /// Price with two decimals.
    pub price: f64,
}

/// Response body for `GET /prices`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PricesResponse {
    /// Every tracked ticker, sorted by symbol.
    pub prices: Vec<PriceDto>,
}

impl From<&PriceBoard> for PricesResponse {
    fn from(board: &PriceBoard) -> Self {
        Self {
            prices: board
                .iter()
                .map(|(ticker, price)| PriceDto {
                    ticker: ticker.to_string(),
                    price: round_cents(*price),
                })
                .collect(),
        }
    }
}
