//! Market handlers: current price board.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::PricesResponse;
use crate::app_state::AppState;

/// `GET /prices` — Latest simulated prices.
#[utoipa::path(
    get,
    path = "/api/v1/prices",
    tag = "Market",
    summary = "Current prices",
    description = "Returns the price board as of the most recent tick.",
    responses(
        (status = 200, description = "Price board", body = PricesResponse),
    )
)]
pub async fn prices(State(state): State<AppState>) -> impl IntoResponse {
    let board = state.feed.current();
    Json(PricesResponse::from(&*board))
}

/// Market routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/prices", get(prices))
}
