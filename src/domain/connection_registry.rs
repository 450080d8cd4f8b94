//! Registry of live streaming connections, one per session token.
//!
//! [`ConnectionRegistry`] is the only structure touched by both the
//! connection lifecycle and the broadcast tick. All access goes through a
//! single [`tokio::sync::RwLock`]: register/remove take the write lock,
//! [`ConnectionRegistry::snapshot`] takes the read lock and copies the
//! handles out, so a tick iterates a consistent point-in-time view while
//! connections keep coming and going.

use std::collections::HashMap;

use tokio::sync::RwLock;

use super::connection::{CloseReason, ConnectionHandle};
use super::{ConnectionId, SessionToken};

/// Token → connection map with supersede-on-reuse semantics.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: RwLock<HashMap<SessionToken, ConnectionHandle>>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handle` under its session token.
    ///
    /// If another connection was registered under the same token it is
    /// closed with [`CloseReason::Superseded`] and returned. The registry
    /// never holds two entries for one token.
    pub async fn register(&self, handle: ConnectionHandle) -> Option<ConnectionHandle> {
        let token = handle.token().clone();
        let id = handle.id();
        let previous = self.connections.write().await.insert(token, handle);
        if let Some(prev) = &previous
            && prev.id() != id
        {
            prev.close(CloseReason::Superseded);
            tracing::info!(
                token = %prev.token().redacted(),
                superseded = %prev.id(),
                connection = %id,
                "connection superseded"
            );
        }
        previous
    }

    /// Evicts whatever connection is registered under `token`.
    ///
    /// The evicted connection is closed. Removing an absent token is a
    /// no-op and returns `None`.
    pub async fn remove(&self, token: &SessionToken) -> Option<ConnectionHandle> {
        let removed = self.connections.write().await.remove(token);
        if let Some(handle) = &removed {
            handle.close(CloseReason::Evicted);
        }
        removed
    }

    /// Removes the entry for `token` only if it is still connection `id`.
    ///
    /// Used by a connection tearing itself down, so a superseded
    /// connection cannot evict its successor. Returns `true` if an entry
    /// was removed.
    pub async fn remove_connection(&self, token: &SessionToken, id: ConnectionId) -> bool {
        let mut map = self.connections.write().await;
        if map.get(token).is_some_and(|h| h.id() == id) {
            map.remove(token);
            true
        } else {
            false
        }
    }

    /// Returns a point-in-time copy of every registered connection.
    pub async fn snapshot(&self) -> Vec<ConnectionHandle> {
        self.connections.read().await.values().cloned().collect()
    }

    /// Returns the number of registered connections.
    pub async fn len(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Returns `true` if no connection is registered.
    pub async fn is_empty(&self) -> bool {
        self.connections.read().await.is_empty()
    }
}
