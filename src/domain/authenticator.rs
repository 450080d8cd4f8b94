//! Session-token authentication for streaming connections and REST calls.

use std::sync::Arc;

use super::account::Account;
use super::{SessionToken, UserStore};
use crate::error::AuthError;

/// Validates presented tokens against the [`UserStore`].
///
/// Read-only: authenticating never mutates the store. A token that has
/// been reissued stops authenticating immediately, but connections that
/// were registered under it keep streaming until they close.
#[derive(Debug, Clone)]
pub struct SessionAuthenticator {
    store: Arc<UserStore>,
}

impl SessionAuthenticator {
    /// Creates an authenticator reading from `store`.
    #[must_use]
    pub fn new(store: Arc<UserStore>) -> Self {
        Self { store }
    }

    /// Resolves the account owning `token`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidToken`] when the token is absent, empty,
    /// or not held by any account. The presented value must match the
    /// stored token exactly.
    pub async fn authenticate(&self, token: Option<&str>) -> Result<Account, AuthError> {
        let raw = token
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::InvalidToken)?;
        let token = SessionToken::from_raw(raw);
        match self.store.find_by_session_token(&token).await {
            Some(account) => Ok(account),
            None => {
                tracing::warn!(token = %token.redacted(), "session token rejected");
                Err(AuthError::InvalidToken)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    async fn store_with(email: &str) -> (Arc<UserStore>, SessionToken) {
        let store = Arc::new(UserStore::new());
        let account = Account::new(email.to_string(), "pw".to_string());
        let token = account.session_token.clone();
        if store.insert(account).await.is_err() {
            panic!("insert failed");
        }
        (store, token)
    }

    #[tokio::test]
    async fn valid_token_yields_account() {
        let (store, token) = store_with("a@example.com").await;
        let auth = SessionAuthenticator::new(store);
        let Ok(account) = auth.authenticate(Some(token.as_str())).await else {
            panic!("token should authenticate");
        };
        assert_eq!(account.email, "a@example.com");
    }

    #[tokio::test]
    async fn missing_or_blank_token_fails() {
        let (store, _) = store_with("a@example.com").await;
        let auth = SessionAuthenticator::new(store);
        assert_eq!(auth.authenticate(None).await, Err(AuthError::InvalidToken));
        assert_eq!(auth.authenticate(Some("")).await, Err(AuthError::InvalidToken));
        assert_eq!(
            auth.authenticate(Some("  ")).await,
            Err(AuthError::InvalidToken)
        );
    }

    #[tokio::test]
    async fn padded_token_does_not_match() {
        let (store, token) = store_with("a@example.com").await;
        let auth = SessionAuthenticator::new(store);
        let padded = format!(" {} ", token.as_str());
        assert_eq!(
            auth.authenticate(Some(&padded)).await,
            Err(AuthError::InvalidToken)
        );
        assert!(auth.authenticate(Some(token.as_str())).await.is_ok());
    }

    #[tokio::test]
    async fn unknown_token_fails() {
        let (store, _) = store_with("a@example.com").await;
        let auth = SessionAuthenticator::new(store);
        assert_eq!(
            auth.authenticate(Some("not-a-token")).await,
            Err(AuthError::InvalidToken)
        );
    }

    #[tokio::test]
    async fn reissued_token_stops_authenticating() {
        let (store, old) = store_with("a@example.com").await;
        let auth = SessionAuthenticator::new(Arc::clone(&store));
        let Some(account) = store.find_by_session_token(&old).await else {
            panic!("account missing");
        };
        let fresh = SessionToken::issue();
        store
            .save(Account {
                session_token: fresh.clone(),
                ..account
            })
            .await;
        assert_eq!(
            auth.authenticate(Some(old.as_str())).await,
            Err(AuthError::InvalidToken)
        );
        assert!(auth.authenticate(Some(fresh.as_str())).await.is_ok());
    }
}
