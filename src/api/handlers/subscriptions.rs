//! Subscription handlers: list, add, remove.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use super::bearer_token;
use crate::api::dto::{SubscriptionRequest, SubscriptionResponse, ticker_strings};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, GatewayError};

/// `GET /subscriptions` — Current subscription set.
///
/// # Errors
///
/// Returns [`GatewayError::Unauthorized`] for a missing or unknown token.
#[utoipa::path(
    get,
    path = "/api/v1/subscriptions",
    tag = "Subscriptions",
    summary = "List subscriptions",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Subscribed tickers", body = SubscriptionResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    )
)]
pub async fn list_subscriptions(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, GatewayError> {
    let token = bearer_token(&headers)?;
    let account = state.account_service.account(token).await?;
    Ok(Json(SubscriptionResponse {
        subscribed_tickers: ticker_strings(&account.subscribed_tickers),
    }))
}

/// `POST /subscriptions` — Subscribe to tickers.
///
/// Takes effect on the next broadcast tick.
///
/// # Errors
///
/// Returns [`GatewayError`] for bad symbols, untracked tickers, or an
/// invalid token.
#[utoipa::path(
    post,
    path = "/api/v1/subscriptions",
    tag = "Subscriptions",
    summary = "Subscribe to tickers",
    description = "Adds tickers to the subscription set. Every ticker must be tracked by the price simulator. Takes effect on the next tick.",
    security(("bearer" = [])),
    request_body = SubscriptionRequest,
    responses(
        (status = 200, description = "Updated subscription set", body = SubscriptionResponse),
        (status = 400, description = "Malformed ticker", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Ticker not tracked", body = ErrorResponse),
    )
)]
pub async fn subscribe(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<SubscriptionRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let token = bearer_token(&headers)?;
    let tickers = state
        .account_service
        .subscribe(token, &req.tickers)
        .await?;
    Ok(Json(SubscriptionResponse {
        subscribed_tickers: ticker_strings(&tickers),
    }))
}

/// `DELETE /subscriptions` — Unsubscribe from tickers.
///
/// # Errors
///
/// Returns [`GatewayError`] for bad symbols or an invalid token.
#[utoipa::path(
    delete,
    path = "/api/v1/subscriptions",
    tag = "Subscriptions",
    summary = "Unsubscribe from tickers",
    description = "Removes tickers from the subscription set; absent tickers are ignored. Takes effect on the next tick.",
    security(("bearer" = [])),
    request_body = SubscriptionRequest,
    responses(
        (status = 200, description = "Updated subscription set", body = SubscriptionResponse),
        (status = 400, description = "Malformed ticker", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    )
)]
pub async fn unsubscribe(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<SubscriptionRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let token = bearer_token(&headers)?;
    let tickers = state
        .account_service
        .unsubscribe(token, &req.tickers)
        .await?;
    Ok(Json(SubscriptionResponse {
        subscribed_tickers: ticker_strings(&tickers),
    }))
}

/// Subscription routes.
pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/subscriptions",
        get(list_subscriptions).post(subscribe).delete(unsubscribe),
    )
}
