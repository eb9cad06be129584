//! HTTP route assembly

pub mod dispatch;
pub mod models;

use axum::routing::{get, post};
use axum::{middleware, Router};
use tower_http::trace::TraceLayer;

use crate::middleware::fallback::route_request;
use crate::state::AppState;

/// Build the gateway router with the routing layer installed
///
/// All completion-shaped endpoints share one dispatcher; the routing
/// middleware in front of them decides local/mapped/fallback handling.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/v1/chat/completions", post(dispatch::completion_dispatch))
        .route("/v1/messages", post(dispatch::completion_dispatch))
        .route(
            "/v1beta/models/{action}",
            post(dispatch::completion_dispatch),
        )
        .route("/v1beta/{*path}", post(dispatch::completion_dispatch))
        .route("/v1/models", get(models::list_models))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            route_request,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
