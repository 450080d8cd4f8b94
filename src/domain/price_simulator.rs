//! Simulated price state and its random-walk step.
//!
//! [`PriceSimulator`] owns the canonical ticker → price board. Each call to
//! [`PriceSimulator::advance`] moves every tracked price by an independent
//! random step of at most `max_step_pct` percent, quantizes it to cents and
//! clamps it to a positive floor so the walk can never reach zero.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Serialize, Serializer};

use super::Ticker;

/// Ticker → current price, in cents precision.
pub type PriceBoard = BTreeMap<Ticker, f64>;

/// Default maximum step per tick, in percent of the current price.
pub const DEFAULT_MAX_STEP_PCT: f64 = 0.5;

/// Default lowest price a ticker may reach.
pub const DEFAULT_PRICE_FLOOR: f64 = 0.01;

/// Rounds `value` to two decimals.
#[must_use]
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn serialize_cents<S: Serializer>(price: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(round_cents(*price))
}

/// One outbound price update: `{"ticker": "GOOG", "price": 140.25}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceUpdate {
    /// Ticker symbol.
    pub ticker: Ticker,
    /// Price quantized to two decimals.
    #[serde(serialize_with = "serialize_cents")]
    pub price: f64,
}

/// Random-walk parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulatorSettings {
    /// Largest per-tick move, in percent of the current price.
    pub max_step_pct: f64,
    /// Prices never go below this value.
    pub floor: f64,
}

impl Default for SimulatorSettings {
    fn default() -> Self {
        Self {
            max_step_pct: DEFAULT_MAX_STEP_PCT,
            floor: DEFAULT_PRICE_FLOOR,
        }
    }
}

impl SimulatorSettings {
    /// Replaces non-finite or out-of-range values with the defaults.
    #[must_use]
    pub fn sanitized(self) -> Self {
        let max_step_pct = if self.max_step_pct.is_finite() && self.max_step_pct >= 0.0 {
            self.max_step_pct
        } else {
            DEFAULT_MAX_STEP_PCT
        };
        let floor = if self.floor.is_finite() && self.floor > 0.0 {
            round_cents(self.floor).max(DEFAULT_PRICE_FLOOR)
        } else {
            DEFAULT_PRICE_FLOOR
        };
        Self {
            max_step_pct,
            floor,
        }
    }
}

/// Owner of the canonical price board.
///
/// The ticker universe is fixed at construction: `advance` never adds or
/// removes a ticker.
#[derive(Debug)]
pub struct PriceSimulator {
    board: PriceBoard,
    settings: SimulatorSettings,
    rng: StdRng,
}

impl PriceSimulator {
    /// Creates a simulator seeded from the operating system RNG.
    #[must_use]
    pub fn new(
        initial: impl IntoIterator<Item = (Ticker, f64)>,
        settings: SimulatorSettings,
    ) -> Self {
        Self::with_rng(initial, settings, StdRng::from_os_rng())
    }

    /// Creates a simulator with a deterministic RNG seed.
    #[must_use]
    pub fn with_seed(
        initial: impl IntoIterator<Item = (Ticker, f64)>,
        settings: SimulatorSettings,
        seed: u64,
    ) -> Self {
        Self::with_rng(initial, settings, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        initial: impl IntoIterator<Item = (Ticker, f64)>,
        settings: SimulatorSettings,
        rng: StdRng,
    ) -> Self {
        let settings = settings.sanitized();
        let board = initial
            .into_iter()
            .map(|(ticker, price)| (ticker, round_cents(price).max(settings.floor)))
            .collect();
        Self {
            board,
            settings,
            rng,
        }
    }

    /// Moves every tracked price one random step.
    ///
    /// Returns the number of tickers that were updated. A ticker whose
    /// current price is not a finite number is left alone for this tick.
    pub fn advance(&mut self) -> usize {
        let max_step = self.settings.max_step_pct / 100.0;
        let floor = self.settings.floor;
        let mut updated = 0;
        for (ticker, price) in &mut self.board {
            if !price.is_finite() {
                tracing::warn!(%ticker, "skipping ticker with non-finite price");
                continue;
            }
            let step = self.rng.random_range(-max_step..=max_step);
            *price = round_cents(*price * (1.0 + step)).max(floor);
            updated += 1;
        }
        updated
    }

    /// Returns the whole board.
    #[must_use]
    pub const fn board(&self) -> &PriceBoard {
        &self.board
    }

    /// Returns the effective settings.
    #[must_use]
    pub const fn settings(&self) -> SimulatorSettings {
        self.settings
    }
}
