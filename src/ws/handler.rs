//! Axum WebSocket upgrade handler.

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use serde::Deserialize;

use super::connection::run_connection;
use crate::app_state::AppState;

/// Query parameters of the streaming endpoint.
#[derive(Debug, Deserialize)]
pub struct StreamParams {
    /// Session token. Missing tokens are rejected after the upgrade with
    /// close code 1008.
    pub token: Option<String>,
}

/// `GET /ws?token=…` — Upgrade HTTP connection to a price stream.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<StreamParams>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| run_connection(socket, params.token, state))
}
