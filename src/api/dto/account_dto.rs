//! DTOs for account registration, login, and the account view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::common_dto::ticker_strings;
use crate::domain::{Account, HistoryAction, HistoryEntry};

/// Request body for `POST /accounts` and `POST /sessions`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CredentialsRequest {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
}

/// Response carrying a freshly issued session token.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionResponse {
    /// Account email.
    pub email: String,
    /// Session token to present as `?token=` on `/ws` and as a Bearer token.
    pub token: String,
}

impl From<&Account> for SessionResponse {
    fn from(account: &Account) -> Self {
        Self {
            email: account.email.clone(),
            token: account.session_token.as_str().to_string(),
        }
    }
}

/// Response body for `GET /me`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AccountResponse {
    /// Account email.
    pub email: String,
    /// Subscribed ticker symbols, sorted.
    pub subscribed_tickers: Vec<String>,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<&Account> for AccountResponse {
    fn from(account: &Account) -> Self {
        Self {
            email: account.email.clone(),
            subscribed_tickers: ticker_strings(&account.subscribed_tickers),
            created_at: account.created_at,
        }
    }
}

/// One history entry.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HistoryEntryDto {
    /// Kind of activity.
    pub action: HistoryAction,
    /// Ticker involved, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,
    /// When it happened.
    pub at: DateTime<Utc>,
}

impl From<HistoryEntry> for HistoryEntryDto {
    fn from(entry: HistoryEntry) -> Self {
        Self {
            action: entry.action,
            ticker: entry.ticker.map(String::from),
            at: entry.at,
        }
    }
}

/// Response body for `GET /me/history`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HistoryResponse {
    /// Entries, oldest first.
    pub entries: Vec<HistoryEntryDto>,
}
