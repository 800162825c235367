// src/routes/ember.rs
//! `GET /v4/ember/{code}/{period}.json` – energy and emissions history for
//! one country or region.
//!
//! The period is checked before the code, and both before any upstream call.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tracing::info;

use super::AppState;
use crate::error::{BridgeError, Result};
use crate::models::Period;
use crate::render::{render_bundle, CONTENT_TYPE_JSON};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/v4/ember/{code}/{file}", get(handler))
}

async fn handler(
    State(state): State<AppState>,
    Path((code, file)): Path<(String, String)>,
) -> Result<Response> {
    // ---
    let Some(period) = file.strip_suffix(".json") else {
        return Ok(StatusCode::NOT_FOUND.into_response());
    };
    let period: Period = period.parse()?;

    let entity = state
        .registry
        .find_by_code(&code)
        .ok_or_else(|| BridgeError::UnknownEntity(code.clone()))?;

    info!("fetching {} data for country/region {}", period, entity.name);
    let bundle = state.fetcher.fetch(entity, period).await?;
    let body = render_bundle(&bundle)?;

    Ok(([(header::CONTENT_TYPE, CONTENT_TYPE_JSON)], body).into_response())
}
