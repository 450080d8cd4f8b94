//! In-memory account storage with a session-token index.
//!
//! [`UserStore`] keeps every [`Account`] in a `HashMap` keyed by email,
//! plus a token index for the lookups the streaming core performs on
//! every tick. Both maps live behind a single [`tokio::sync::RwLock`], so
//! each mutation is one atomic step and readers always receive cloned
//! snapshots rather than references into the map.

use std::collections::{BTreeSet, HashMap};

use tokio::sync::RwLock;

use super::account::Account;
use super::{SessionToken, Ticker};
use crate::error::GatewayError;

#[derive(Debug, Default)]
struct Inner {
    accounts: HashMap<String, Account>,
    tokens: HashMap<SessionToken, String>,
}

impl Inner {
    fn account_for(&self, token: &SessionToken) -> Option<&Account> {
        self.tokens
            .get(token)
            .and_then(|email| self.accounts.get(email))
    }
}

/// Central store for all registered accounts.
///
/// # Concurrency
///
/// - Token lookups and subscription reads take the read lock.
/// - [`UserStore::insert`] and [`UserStore::save`] take the write lock, so
///   the account map and the token index never disagree.
/// - Read-modify-write of one account is the caller's job to serialize;
///   `AccountService` does it with a per-account lock held across the
///   database write.
#[derive(Debug, Default)]
pub struct UserStore {
    inner: RwLock<Inner>,
}

impl UserStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new account.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::AccountExists`] if an account with the same
    /// email is already stored.
    pub async fn insert(&self, account: Account) -> Result<(), GatewayError> {
        let mut inner = self.inner.write().await;
        if inner.accounts.contains_key(&account.email) {
            return Err(GatewayError::AccountExists(account.email));
        }
        inner
            .tokens
            .insert(account.session_token.clone(), account.email.clone());
        inner.accounts.insert(account.email.clone(), account);
        Ok(())
    }

    /// Replaces the store contents with previously persisted accounts.
    pub async fn load(&self, accounts: impl IntoIterator<Item = Account>) {
        let mut inner = self.inner.write().await;
        inner.accounts.clear();
        inner.tokens.clear();
        for account in accounts {
            inner
                .tokens
                .insert(account.session_token.clone(), account.email.clone());
            inner.accounts.insert(account.email.clone(), account);
        }
    }

    /// Returns the account currently holding `token`.
    pub async fn find_by_session_token(&self, token: &SessionToken) -> Option<Account> {
        self.inner.read().await.account_for(token).cloned()
    }

    /// Returns the account registered under `email`.
    pub async fn find_by_email(&self, email: &str) -> Option<Account> {
        self.inner.read().await.accounts.get(email).cloned()
    }

    /// Returns a snapshot of the subscription set of the account holding
    /// `token`, or `None` if no account holds it.
    pub async fn subscribed_tickers(&self, token: &SessionToken) -> Option<BTreeSet<Ticker>> {
        self.inner
            .read()
            .await
            .account_for(token)
            .map(|account| account.subscribed_tickers.clone())
    }

    /// Stores `account` under its email, replacing any previous version.
    ///
    /// The token index follows the account: if the stored version held a
    /// different token, that token stops resolving. Connections already
    /// streaming under it are not touched.
    pub async fn save(&self, account: Account) {
        let mut inner = self.inner.write().await;
        let retired = inner
            .accounts
            .get(&account.email)
            .map(|prev| prev.session_token.clone())
            .filter(|prev| *prev != account.session_token);
        if let Some(retired) = retired {
            inner.tokens.remove(&retired);
        }
        inner
            .tokens
            .insert(account.session_token.clone(), account.email.clone());
        inner.accounts.insert(account.email.clone(), account);
    }

    /// Returns the number of stored accounts.
    pub async fn len(&self) -> usize {
        self.inner.read().await.accounts.len()
    }

    /// Returns `true` if the store holds no accounts.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.accounts.is_empty()
    }
}
