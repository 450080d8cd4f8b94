//! WebSocket wire frames: price updates and close frames.

use axum::extract::ws::{CloseFrame, Message, close_code};

use crate::domain::PriceUpdate;

/// Close reason sent when authentication fails.
pub const INVALID_TOKEN_REASON: &str = "invalid session token";

/// Close reason sent to a connection replaced by a newer one.
pub const SUPERSEDED_REASON: &str = "session superseded";

/// Close reason sent to a connection evicted by the server.
pub const EVICTED_REASON: &str = "connection evicted";

/// Encodes one price update as a text frame.
///
/// # Errors
///
/// Returns the serializer error if the update cannot be encoded.
pub fn update_frame(update: &PriceUpdate) -> Result<Message, serde_json::Error> {
    Ok(Message::text(serde_json::to_string(update)?))
}

/// Close frame for a rejected session token (code 1008, policy violation).
#[must_use]
pub fn policy_violation_frame() -> Message {
    Message::Close(Some(CloseFrame {
        code: close_code::POLICY,
        reason: INVALID_TOKEN_REASON.into(),
    }))
}

/// Normal-closure frame carrying `reason`.
#[must_use]
pub fn normal_close_frame(reason: &'static str) -> Message {
    Message::Close(Some(CloseFrame {
        code: close_code::NORMAL,
        reason: reason.into(),
    }))
}
