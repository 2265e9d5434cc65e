//! Liveness endpoint

use axum::{routing::get, Router};

use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(ping))
}

/// GET /api/ping
///
/// Plain-text `ok` once the server is accepting requests.
async fn ping() -> &'static str {
    "ok"
}
