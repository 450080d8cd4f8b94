//! Account handlers: register, login, account view, history.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use super::bearer_token;
use crate::api::dto::{
    AccountResponse, CredentialsRequest, HistoryEntryDto, HistoryResponse, SessionResponse,
};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, GatewayError};

/// `POST /accounts` — Register a new account.
///
/// # Errors
///
/// Returns [`GatewayError`] on invalid input or a taken email.
#[utoipa::path(
    post,
    path = "/api/v1/accounts",
    tag = "Accounts",
    summary = "Register an account",
    description = "Creates an account and returns its first session token.",
    request_body = CredentialsRequest,
    responses(
        (status = 201, description = "Account created", body = SessionResponse),
        (status = 400, description = "Invalid email or password", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let account = state
        .account_service
        .register(&req.email, &req.password)
        .await?;
    Ok((StatusCode::CREATED, Json(SessionResponse::from(&account))))
}

/// `POST /sessions` — Log in and receive a new session token.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidCredentials`] on a bad email/password.
#[utoipa::path(
    post,
    path = "/api/v1/sessions",
    tag = "Accounts",
    summary = "Log in",
    description = "Verifies credentials and reissues the session token. The previous token stops authenticating new connections.",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Logged in", body = SessionResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let account = state
        .account_service
        .login(&req.email, &req.password)
        .await?;
    Ok(Json(SessionResponse::from(&account)))
}

/// `GET /me` — Current account.
///
/// # Errors
///
/// Returns [`GatewayError::Unauthorized`] for a missing or unknown token.
#[utoipa::path(
    get,
    path = "/api/v1/me",
    tag = "Accounts",
    summary = "Current account",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Account view", body = AccountResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    )
)]
pub async fn me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, GatewayError> {
    let token = bearer_token(&headers)?;
    let account = state.account_service.account(token).await?;
    Ok(Json(AccountResponse::from(&account)))
}

/// `GET /me/history` — Activity history of the current account.
///
/// # Errors
///
/// Returns [`GatewayError::Unauthorized`] for a missing or unknown token.
#[utoipa::path(
    get,
    path = "/api/v1/me/history",
    tag = "Accounts",
    summary = "Account history",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "History entries, oldest first", body = HistoryResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    )
)]
pub async fn history(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, GatewayError> {
    let token = bearer_token(&headers)?;
    let entries = state.account_service.history(token).await?;
    Ok(Json(HistoryResponse {
        entries: entries.into_iter().map(HistoryEntryDto::from).collect(),
    }))
}

/// Account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", post(register))
        .route("/sessions", post(login))
        .route("/me", get(me))
        .route("/me/history", get(history))
}
