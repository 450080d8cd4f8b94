//! Market ticker symbols.
//!
//! [`Ticker`] is a validated, uppercase symbol such as `"GOOG"`. It is the
//! key of the price board, the element type of every subscription set,
//! and the `ticker` field of every outbound price update.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

/// Maximum accepted symbol length.
const MAX_TICKER_LEN: usize = 12;

/// A validated ticker symbol.
///
/// Parsing trims surrounding whitespace and uppercases ASCII letters, so
/// `" goog "` and `"GOOG"` name the same instrument. Accepted characters
/// are `A-Z`, `0-9`, `.` and `-`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    /// Parses and normalizes a ticker symbol.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidTicker`] if the symbol is empty,
    /// longer than 12 characters, or contains unsupported characters.
    pub fn parse(raw: &str) -> Result<Self, GatewayError> {
        let symbol = raw.trim().to_ascii_uppercase();
        let valid = !symbol.is_empty()
            && symbol.len() <= MAX_TICKER_LEN
            && symbol
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '.' || c == '-');
        if valid {
            Ok(Self(symbol))
        } else {
            Err(GatewayError::InvalidTicker(raw.to_string()))
        }
    }

    /// Returns the symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Ticker {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Ticker {
    type Error = GatewayError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Ticker> for String {
    fn from(ticker: Ticker) -> Self {
        ticker.0
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn parse_normalizes_case_and_whitespace() {
        let Ok(ticker) = Ticker::parse("  goog ") else {
            panic!("valid ticker");
        };
        assert_eq!(ticker.as_str(), "GOOG");
    }

    #[test]
    fn parse_accepts_class_suffixes() {
        assert!(Ticker::parse("BRK.B").is_ok());
        assert!(Ticker::parse("RDS-A").is_ok());
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(Ticker::parse("").is_err());
        assert!(Ticker::parse("   ").is_err());
        assert!(Ticker::parse("GO OG").is_err());
        assert!(Ticker::parse("G$").is_err());
        assert!(Ticker::parse("ABCDEFGHIJKLM").is_err());
    }

    #[test]
    fn serde_uses_plain_string() {
        let Ok(ticker) = Ticker::parse("TSLA") else {
            panic!("valid ticker");
        };
        let json = serde_json::to_string(&ticker).ok();
        assert_eq!(json.as_deref(), Some("\"TSLA\""));

        let back: Result<Ticker, _> = serde_json::from_str("\"tsla\"");
        let Ok(back) = back else {
            panic!("deserialization failed");
        };
        assert_eq!(back, ticker);
    }

    #[test]
    fn deserialize_rejects_invalid_symbol() {
        let parsed: Result<Ticker, _> = serde_json::from_str("\"not a ticker\"");
        assert!(parsed.is_err());
    }
}
