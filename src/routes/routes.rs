//! Defines the gateway's routes.
//!
//! ## Structure
//! - **Probes** (outside the key space)
//!   - `GET /-/healthz` — liveness
//!   - `GET /-/readyz`  — store reachability
//!
//! - **Gateway**
//!   - `GET /`        — bucket root listing
//!   - `GET /{*path}` — prefix listing (trailing `/`) or object download
//!
//! `HEAD` is answered by the same handlers; every other method gets 405.
//!
//! The probe routes shadow objects whose keys resolve to exactly `-/healthz`
//! or `-/readyz`. They are matched on the raw request path, so they stay at
//! the server root even when a base path is configured.

use crate::{
    handlers::{
        gateway_handlers::browse,
        health_handlers::{healthz, readyz},
    },
    state::AppState,
};
use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

/// Build and return the gateway router.
///
/// The router carries shared state (`AppState`) to all handlers.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/-/healthz", get(healthz))
        .route("/-/readyz", get(readyz))
        .route("/", get(browse))
        .route("/{*path}", get(browse))
        .layer(TraceLayer::new_for_http())
}
