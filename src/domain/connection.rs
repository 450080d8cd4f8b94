//! Handle to one registered streaming connection.
//!
//! A [`ConnectionHandle`] is what the registry stores and what the
//! broadcast fan-out delivers to. It owns the sending half of a bounded
//! outbound queue plus a shared close signal; the WebSocket task that
//! owns the actual socket holds the receiving half and watches the
//! signal, so closing a handle closes the transport.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Utc};
use tokio::sync::{Notify, mpsc};

use super::price_simulator::PriceUpdate;
use super::{ConnectionId, SessionToken};
use crate::error::SendFailure;

/// Why a connection was closed from the server side or observed closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// A newer connection registered under the same session token.
    Superseded,
    /// Explicitly removed from the registry.
    Evicted,
    /// The client closed the socket or the transport failed.
    TransportClosed,
    /// A frame could not be written within the send timeout.
    SendTimeout,
}

#[derive(Debug, Default)]
struct CloseSignal {
    reason: OnceLock<CloseReason>,
    closed: AtomicBool,
    notify: Notify,
}

/// Cheaply cloneable handle to a live (or recently closed) connection.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    token: SessionToken,
    created_at: DateTime<Utc>,
    outbound: mpsc::Sender<PriceUpdate>,
    signal: Arc<CloseSignal>,
}

impl ConnectionHandle {
    /// Creates a handle with an outbound queue of `capacity` updates.
    ///
    /// Returns the handle and the receiving half of the queue, which the
    /// transport writer drains.
    #[must_use]
    pub fn new(token: SessionToken, capacity: usize) -> (Self, mpsc::Receiver<PriceUpdate>) {
        let (outbound, rx) = mpsc::channel(capacity.max(1));
        let handle = Self {
            id: ConnectionId::new(),
            token,
            created_at: Utc::now(),
            outbound,
            signal: Arc::new(CloseSignal::default()),
        };
        (handle, rx)
    }

    /// Connection identifier.
    #[must_use]
    pub const fn id(&self) -> ConnectionId {
        self.id
    }

    /// Session token the connection authenticated with.
    #[must_use]
    pub const fn token(&self) -> &SessionToken {
        &self.token
    }

    /// When the connection was registered.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns `true` while the connection can still accept updates.
    #[must_use]
    pub fn is_open(&self) -> bool {
        !self.signal.closed.load(Ordering::Acquire) && !self.outbound.is_closed()
    }

    /// Returns the reason the connection was closed, if it has been.
    #[must_use]
    pub fn close_reason(&self) -> Option<CloseReason> {
        self.signal.reason.get().copied()
    }

    /// Closes the connection. Only the first call records its reason;
    /// later calls are no-ops.
    pub fn close(&self, reason: CloseReason) {
        if self.signal.reason.set(reason).is_ok() {
            self.signal.closed.store(true, Ordering::Release);
            self.signal.notify.notify_waiters();
        }
    }

    /// Resolves once [`ConnectionHandle::close`] has been called.
    pub async fn closed(&self) {
        loop {
            let notified = self.signal.notify.notified();
            if self.signal.closed.load(Ordering::Acquire) {
                return;
            }
            notified.await;
        }
    }

    /// Queues one update without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`SendFailure::Backpressure`] when the queue is full and
    /// [`SendFailure::Closed`] when the connection is closed.
    pub fn try_deliver(&self, update: PriceUpdate) -> Result<(), SendFailure> {
        if self.signal.closed.load(Ordering::Acquire) {
            return Err(SendFailure::Closed);
        }
        self.outbound.try_send(update).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SendFailure::Backpressure,
            mpsc::error::TrySendError::Closed(_) => SendFailure::Closed,
        })
    }
}
