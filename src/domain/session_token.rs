//! Opaque session credentials and connection identity.
//!
//! [`SessionToken`] is the credential a client presents when opening a
//! stream. [`ConnectionId`] identifies one physical streaming connection,
//! so a superseded connection can tear itself down without evicting the
//! connection that replaced it under the same token.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of leading characters kept by [`SessionToken::redacted`].
const REDACTED_PREFIX_LEN: usize = 8;

/// Opaque session token.
///
/// Issued as a random UUID v4 string on registration and reissued on
/// every successful login. Comparison is exact string equality. `Debug`
/// prints the redacted form only.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SessionToken").field(&self.redacted()).finish()
    }
}

impl SessionToken {
    /// Issues a fresh random token.
    #[must_use]
    pub fn issue() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Wraps a token presented by a client or loaded from storage.
    #[must_use]
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the raw token string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns a short prefix suitable for logs.
    #[must_use]
    pub fn redacted(&self) -> String {
        let prefix: String = self.0.chars().take(REDACTED_PREFIX_LEN).collect();
        format!("{prefix}…")
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for one streaming connection (UUID v4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(uuid::Uuid);

impl ConnectionId {
    /// Creates a new random `ConnectionId`.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
