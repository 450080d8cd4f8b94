//! WebSocket connection state machine.
//!
//! Authenticates the presented token, registers the connection, then runs
//! the read/write loop: drains the connection's outbound queue into text
//! frames and watches the socket and the close signal until one of them
//! ends the stream.

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};

use super::messages::{
    EVICTED_REASON, SUPERSEDED_REASON, normal_close_frame, policy_violation_frame, update_frame,
};
use crate::app_state::AppState;
use crate::domain::{CloseReason, ConnectionHandle};

/// Lifecycle phase of one streaming connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Socket accepted, token not yet checked.
    Unauthenticated,
    /// Token lookup in progress.
    Authenticating,
    /// In the registry and receiving broadcasts.
    Registered,
    /// Terminal.
    Closed,
}

impl ConnectionState {
    /// Returns `true` if moving from `self` to `next` is allowed.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Unauthenticated, Self::Authenticating)
                | (Self::Unauthenticated, Self::Closed)
                | (Self::Authenticating, Self::Registered)
                | (Self::Authenticating, Self::Closed)
                | (Self::Registered, Self::Closed)
        )
    }
}

/// Tracks the phase of one connection and refuses illegal transitions.
#[derive(Debug)]
pub struct ConnectionLifecycle {
    state: ConnectionState,
}

impl Default for ConnectionLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionLifecycle {
    /// Starts in [`ConnectionState::Unauthenticated`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: ConnectionState::Unauthenticated,
        }
    }

    /// Current phase.
    #[must_use]
    pub const fn state(&self) -> ConnectionState {
        self.state
    }

    /// Moves to `next` if allowed. Returns `false` and stays put otherwise.
    pub fn advance(&mut self, next: ConnectionState) -> bool {
        if self.state.can_transition_to(next) {
            tracing::trace!(from = ?self.state, to = ?next, "connection state");
            self.state = next;
            true
        } else {
            tracing::warn!(from = ?self.state, to = ?next, "illegal connection transition");
            false
        }
    }
}

/// Runs one streaming connection from upgrade to close.
///
/// - Rejects an absent or unknown token with close code 1008.
/// - Registers the connection, superseding any previous one for the token.
/// - Forwards queued price updates, each write bounded by the send timeout.
/// - On exit, deregisters itself unless it has already been replaced.
pub async fn run_connection(mut socket: WebSocket, token: Option<String>, state: AppState) {
    let mut lifecycle = ConnectionLifecycle::new();
    lifecycle.advance(ConnectionState::Authenticating);

    let account = match state
        .account_service
        .authenticator()
        .authenticate(token.as_deref())
        .await
    {
        Ok(account) => account,
        Err(err) => {
            tracing::info!(error = %err, "ws connection rejected");
            let _ = tokio::time::timeout(
                state.stream.send_timeout,
                socket.send(policy_violation_frame()),
            )
            .await;
            lifecycle.advance(ConnectionState::Closed);
            return;
        }
    };

    let (handle, mut outbound) = ConnectionHandle::new(
        account.session_token.clone(),
        state.stream.outbound_queue_capacity,
    );
    state.registry.register(handle.clone()).await;
    lifecycle.advance(ConnectionState::Registered);
    tracing::info!(connection = %handle.id(), email = %account.email, "ws connection registered");

    let (mut ws_tx, mut ws_rx) = socket.split();
    let send_timeout = state.stream.send_timeout;

    let reason = loop {
        tokio::select! {
            biased;
            () = handle.closed() => {
                break handle.close_reason().unwrap_or(CloseReason::Evicted);
            }
            // Update queued by the broadcast scheduler
            update = outbound.recv() => {
                let Some(update) = update else {
                    break CloseReason::TransportClosed;
                };
                let frame = match update_frame(&update) {
                    Ok(frame) => frame,
                    Err(e) => {
                        tracing::warn!(error = %e, ticker = %update.ticker, "failed to encode update");
                        continue;
                    }
                };
                match tokio::time::timeout(send_timeout, ws_tx.send(frame)).await {
                    Ok(Ok(())) => {}
                    Ok(Err(_)) => break CloseReason::TransportClosed,
                    Err(_) => {
                        tracing::warn!(connection = %handle.id(), "ws send timed out");
                        break CloseReason::SendTimeout;
                    }
                }
            }
            // Incoming message from client
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Close(_)) | Err(_)) | None => break CloseReason::TransportClosed,
                    Some(Ok(Message::Text(text))) => {
                        tracing::debug!(len = text.len(), "ignoring client text frame");
                    }
                    _ => {}
                }
            }
        }
    };

    handle.close(reason);
    state
        .registry
        .remove_connection(handle.token(), handle.id())
        .await;

    let farewell = match reason {
        CloseReason::Superseded => Some(SUPERSEDED_REASON),
        CloseReason::Evicted => Some(EVICTED_REASON),
        CloseReason::TransportClosed | CloseReason::SendTimeout => None,
    };
    if let Some(farewell) = farewell {
        let _ = tokio::time::timeout(send_timeout, ws_tx.send(normal_close_frame(farewell))).await;
    }

    lifecycle.advance(ConnectionState::Closed);
    let lifetime = chrono::Utc::now() - handle.created_at();
    tracing::info!(
        connection = %handle.id(),
        ?reason,
        lifetime_ms = lifetime.num_milliseconds(),
        "ws connection closed"
    );
}
