//! Gateway error types with HTTP status code mapping.
//!
//! [`GatewayError`] is the central error type for the REST surface. Each
//! variant maps to a specific HTTP status code and structured JSON error
//! response. The streaming core has its own narrower errors:
//! [`AuthError`] for session authentication and [`SendFailure`] for
//! per-connection delivery, neither of which ever stops the scheduler.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1002,
///     "message": "invalid ticker symbol: g@@g",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see [`GatewayError`] code ranges).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Failure to authenticate a session token.
///
/// Terminal for the connection attempt that produced it: a streaming
/// connection is closed with policy-violation and never registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The token was absent, unknown, or no longer current.
    #[error("invalid session token")]
    InvalidToken,
}

/// Failure to hand one price update to one connection.
///
/// Isolated to the connection (and message) it occurred on. The fan-out
/// records it and moves on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SendFailure {
    /// The connection's outbound queue is full; the update is dropped.
    #[error("outbound queue full")]
    Backpressure,
    /// The connection is closed or its writer has gone away.
    #[error("connection closed")]
    Closed,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                  |
/// |-----------|-----------------|------------------------------|
/// | 401       | Authentication  | 401 Unauthorized             |
/// | 1000–1999 | Validation      | 400 Bad Request              |
/// | 2000–2999 | State/Not Found | 404 Not Found / 409 Conflict |
/// | 3000–3999 | Server          | 500 Internal Server Error    |
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A ticker symbol failed to parse.
    #[error("invalid ticker symbol: {0}")]
    InvalidTicker(String),

    /// The ticker is well formed but not tracked by the price simulator.
    #[error("ticker not tracked: {0}")]
    UnknownTicker(String),

    /// An account with this email already exists.
    #[error("account already exists: {0}")]
    AccountExists(String),

    /// Email/password pair did not match any account.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Session token missing or not current.
    #[error("unauthorized: {0}")]
    Unauthorized(#[from] AuthError),

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::InvalidTicker(_) => 1002,
            Self::UnknownTicker(_) => 2001,
            Self::AccountExists(_) => 2002,
            Self::InvalidCredentials | Self::Unauthorized(_) => 401,
            Self::PersistenceError(_) => 3001,
            Self::Internal(_) => 3000,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::InvalidTicker(_) => StatusCode::BAD_REQUEST,
            Self::UnknownTicker(_) => StatusCode::NOT_FOUND,
            Self::AccountExists(_) => StatusCode::CONFLICT,
            Self::InvalidCredentials | Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::PersistenceError(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
