//! HTTP API for the persona calendar.

pub mod config;
pub mod kis;
pub mod logging;
pub mod market;
pub mod routes;
pub mod state;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Every route, with CORS and request tracing.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(routes::personas::router())
        .merge(routes::events::router())
        .merge(routes::sync::router())
        .merge(routes::stock::router())
        .merge(routes::holidays::router())
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
