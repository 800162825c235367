//! `GET /api/countries` – the full entity registry.

use axum::{extract::State, routing::get, Json, Router};

use super::AppState;
use crate::countries::Entity;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/countries", get(handler))
}

async fn handler(State(state): State<AppState>) -> Json<Vec<Entity>> {
    Json(state.registry.entities().to_vec())
}
