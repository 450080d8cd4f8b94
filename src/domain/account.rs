//! Account aggregate owned by the [`super::UserStore`].

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{SessionToken, Ticker};

/// Maximum number of history entries kept per account.
pub const HISTORY_LIMIT: usize = 100;

/// What a [`HistoryEntry`] records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    /// The account logged in and received a new session token.
    Login,
    /// A ticker was added to the subscription set.
    Subscribed,
    /// A ticker was removed from the subscription set.
    Unsubscribed,
}

/// One entry in an account's activity history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Kind of activity.
    pub action: HistoryAction,
    /// Ticker involved, if any.
    pub ticker: Option<Ticker>,
    /// When it happened.
    pub at: DateTime<Utc>,
}

/// A registered client account.
///
/// The streaming core never holds its own copy: it reads the subscription
/// set through the store at fan-out time, so edits show up on the next
/// tick without any invalidation.
///
/// `Debug` masks the password and redacts the token.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Account identifier (email-like).
    pub email: String,
    /// Login secret, compared verbatim.
    pub password: String,
    /// Current session token; reissued on each successful login.
    pub session_token: SessionToken,
    /// Tickers this account streams.
    pub subscribed_tickers: BTreeSet<Ticker>,
    /// Recent activity, oldest first.
    pub history: Vec<HistoryEntry>,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("email", &self.email)
            .field("password", &"***")
            .field("session_token", &self.session_token)
            .field("subscribed_tickers", &self.subscribed_tickers)
            .field("history", &self.history.len())
            .field("created_at", &self.created_at)
            .finish()
    }
}

impl Account {
    /// Creates an account with a freshly issued token and no subscriptions.
    #[must_use]
    pub fn new(email: String, password: String) -> Self {
        Self {
            email,
            password,
            session_token: SessionToken::issue(),
            subscribed_tickers: BTreeSet::new(),
            history: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Appends a history entry, dropping the oldest beyond [`HISTORY_LIMIT`].
    pub fn record(&mut self, action: HistoryAction, ticker: Option<Ticker>) {
        self.history.push(HistoryEntry {
            action,
            ticker,
            at: Utc::now(),
        });
        if self.history.len() > HISTORY_LIMIT {
            let excess = self.history.len() - HISTORY_LIMIT;
            self.history.drain(..excess);
        }
    }
}
