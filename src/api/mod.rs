//! REST API layer: route handlers, DTOs, OpenAPI document and router
//! composition.
//!
//! All resource endpoints are mounted under `/api/v1`.

pub mod dto;
pub mod handlers;

use axum::Router;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::app_state::AppState;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes())
}

/// OpenAPI document for the REST surface.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "ticker-gateway",
        description = "Accounts, subscriptions and prices for the ticker streaming gateway. Live updates stream over `GET /ws?token=<session token>`."
    ),
    paths(
        handlers::accounts::register,
        handlers::accounts::login,
        handlers::accounts::me,
        handlers::accounts::history,
        handlers::subscriptions::list_subscriptions,
        handlers::subscriptions::subscribe,
        handlers::subscriptions::unsubscribe,
        handlers::market::prices,
        handlers::system::health_handler,
    ),
    components(schemas(
        dto::CredentialsRequest,
        dto::SessionResponse,
        dto::AccountResponse,
        dto::HistoryEntryDto,
        dto::HistoryResponse,
        dto::SubscriptionRequest,
        dto::SubscriptionResponse,
        dto::PriceDto,
        dto::PricesResponse,
        handlers::system::HealthResponse,
        crate::domain::HistoryAction,
        crate::error::ErrorResponse,
        crate::error::ErrorBody,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "Accounts", description = "Registration, login and account view"),
        (name = "Subscriptions", description = "Which tickers a session streams"),
        (name = "Market", description = "Simulated prices"),
        (name = "System", description = "Operational endpoints"),
    )
)]
pub struct ApiDoc;

/// Registers the `bearer` security scheme referenced by protected paths.
#[derive(Debug)]
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_every_path() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();
        for expected in [
            "/api/v1/accounts",
            "/api/v1/sessions",
            "/api/v1/me",
            "/api/v1/me/history",
            "/api/v1/subscriptions",
            "/api/v1/prices",
            "/health",
        ] {
            assert!(paths.contains(&expected), "missing {expected}");
        }
    }
}
