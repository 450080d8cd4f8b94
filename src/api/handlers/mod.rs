//! REST endpoint handlers organized by resource.

pub mod accounts;
pub mod market;
pub mod subscriptions;
pub mod system;

use axum::Router;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;

use crate::app_state::AppState;
use crate::error::{AuthError, GatewayError};

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(accounts::routes())
        .merge(subscriptions::routes())
        .merge(market::routes())
}

/// Extracts the session token from `Authorization: Bearer <token>`.
///
/// # Errors
///
/// Returns [`GatewayError::Unauthorized`] if the header is missing or not a
/// Bearer credential.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, GatewayError> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(GatewayError::Unauthorized(AuthError::InvalidToken))
}
