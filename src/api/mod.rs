//! API routes and handlers
//!
//! All endpoints live under `/api`; each resource contributes its own
//! sub-router.

use std::time::Duration;

use axum::Router;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::AppState;

mod bids;
mod params;
mod ping;
mod tenders;

/// Resource routes, nested under `/api` by [`create_router`].
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/ping", ping::routes())
        .nest("/tenders", tenders::routes())
        .nest("/bids", bids::routes())
}

/// The full application router with request tracing and CORS applied.
/// Shared by the server binary and the integration test harness.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let mut router = Router::new().nest("/api", routes());
    if let Some(secs) = state.config.server.request_timeout_secs {
        router = router.layer(TimeoutLayer::new(Duration::from_secs(secs)));
    }

    router.with_state(state).layer(trace_layer).layer(cors)
}
