// src/routes/health.rs
//! Liveness endpoint for the Ember bridge.
//!
//! `/health` lets container orchestrators and CI check that the service is
//! up. It is a sibling module in the `routes` directory and follows the
//! Explicit Module Boundary Pattern (EMBP): the handler stays private, and the
//! gateway (`mod.rs`) merges the exported subrouter.

use axum::{routing::get, Json, Router};
use serde::Serialize;

/// JSON response body for the `/health` endpoint.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// Handle `GET /health`.
///
/// Answers without touching the cache or the Ember API.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Create a subrouter containing the `/health` route.
///
/// Generic over the application state so it merges cleanly with the gateway
/// router.
pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/health", get(health))
}
