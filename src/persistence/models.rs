//! Database models for stored accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Account, SessionToken};
use crate::error::GatewayError;

/// A stored row from the `accounts` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountRow {
    /// Account identifier (primary key).
    pub email: String,
    /// Login secret.
    pub password: String,
    /// Current session token.
    pub session_token: String,
    /// JSONB array of ticker symbols.
    pub subscribed_tickers: serde_json::Value,
    /// JSONB array of history entries.
    pub history: serde_json::Value,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

impl AccountRow {
    /// Builds a row from an account.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] if the JSON columns
    /// cannot be encoded.
    pub fn from_account(account: &Account) -> Result<Self, GatewayError> {
        Ok(Self {
            email: account.email.clone(),
            password: account.password.clone(),
            session_token: account.session_token.as_str().to_string(),
            subscribed_tickers: serde_json::to_value(&account.subscribed_tickers)
                .map_err(|e| GatewayError::PersistenceError(e.to_string()))?,
            history: serde_json::to_value(&account.history)
                .map_err(|e| GatewayError::PersistenceError(e.to_string()))?,
            created_at: account.created_at,
        })
    }

    /// Converts the row back into an account.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] if a JSON column holds
    /// something other than the expected shape.
    pub fn into_account(self) -> Result<Account, GatewayError> {
        Ok(Account {
            subscribed_tickers: serde_json::from_value(self.subscribed_tickers)
                .map_err(|e| GatewayError::PersistenceError(e.to_string()))?,
            history: serde_json::from_value(self.history)
                .map_err(|e| GatewayError::PersistenceError(e.to_string()))?,
            email: self.email,
            password: self.password,
            session_token: SessionToken::from_raw(self.session_token),
            created_at: self.created_at,
        })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{HistoryAction, Ticker};

    #[test]
    fn row_preserves_account() {
        let mut account = Account::new("a@example.com".to_string(), "pw".to_string());
        let Ok(goog) = Ticker::parse("GOOG") else {
            panic!("valid ticker");
        };
        account.subscribed_tickers.insert(goog.clone());
        account.record(HistoryAction::Subscribed, Some(goog));

        let Ok(row) = AccountRow::from_account(&account) else {
            panic!("encoding failed");
        };
        assert_eq!(row.subscribed_tickers, serde_json::json!(["GOOG"]));

        let Ok(back) = row.into_account() else {
            panic!("decoding failed");
        };
        assert_eq!(back, account);
    }

    #[test]
    fn bad_ticker_column_is_a_persistence_error() {
        let row = AccountRow {
            email: "a@example.com".to_string(),
            password: "pw".to_string(),
            session_token: "t".to_string(),
            subscribed_tickers: serde_json::json!(["not a ticker"]),
            history: serde_json::json!([]),
            created_at: Utc::now(),
        };
        assert!(matches!(
            row.into_account(),
            Err(GatewayError::PersistenceError(_))
        ));
    }
}
