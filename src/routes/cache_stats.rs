//! `GET /api/cache-stats` – response cache counters.

use axum::{extract::State, routing::get, Json, Router};

use super::AppState;
use crate::cache::CacheStats;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/cache-stats", get(handler))
}

async fn handler(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.cache.stats())
}
