//! Error type shared by the upstream client, the transform pipeline and the
//! HTTP layer.
//!
//! Validation-level failures with a known cause (`InvalidPeriod`,
//! `UnknownEntity`) surface as 404 with a JSON `{"error": ...}` body.
//! Everything else is a 500 with a plain-text body and an `x-error-kind`
//! header naming the variant.

use axum::{
    http::{header::HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Header carrying [`BridgeError::kind`] on 500 responses.
pub const ERROR_KIND_HEADER: &str = "x-error-kind";

/// Plain-text body sent for every 500 response.
pub const INTERNAL_ERROR_BODY: &str = "Error fetching energy data";

#[derive(Debug, Error)]
pub enum BridgeError {
    // ---
    #[error("period '{0}' is not monthly or yearly")]
    InvalidPeriod(String),

    #[error("code '{0}' does not map to a known country or region")]
    UnknownEntity(String),

    #[error("invalid type: {0}")]
    InvalidMetricType(String),

    /// Transport failure or non-2xx status from the Ember API.
    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("failed to decode upstream response: {0}")]
    UpstreamDecode(#[from] serde_json::Error),

    #[error("series \"{series}\" does not have the same dates as the first series")]
    DateMismatch { series: String },

    #[error("there are gaps in the date range: expected {expected} dates, found {actual}")]
    DateGap { expected: usize, actual: usize },

    #[error("date '{date}' is not a valid {period} date")]
    InvalidDate { date: String, period: String },

    #[error("failed to render response: {0}")]
    Render(String),
}

impl BridgeError {
    /// Stable identifier for the variant, used in logs and response headers.
    pub fn kind(&self) -> &'static str {
        // ---
        match self {
            BridgeError::InvalidPeriod(_) => "invalid_period",
            BridgeError::UnknownEntity(_) => "unknown_entity",
            BridgeError::InvalidMetricType(_) => "invalid_metric_type",
            BridgeError::Upstream(_) => "upstream",
            BridgeError::UpstreamDecode(_) => "upstream_decode",
            BridgeError::DateMismatch { .. } => "date_mismatch",
            BridgeError::DateGap { .. } => "date_gap",
            BridgeError::InvalidDate { .. } => "invalid_date",
            BridgeError::Render(_) => "render",
        }
    }

    pub fn status(&self) -> StatusCode {
        // ---
        match self {
            BridgeError::InvalidPeriod(_) | BridgeError::UnknownEntity(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for BridgeError {
    fn into_response(self) -> Response {
        // ---
        let status = self.status();
        if status == StatusCode::NOT_FOUND {
            tracing::info!("{}", self);
            return (status, Json(json!({ "error": self.to_string() }))).into_response();
        }

        tracing::error!(kind = self.kind(), "{}", self);
        let mut response = (status, INTERNAL_ERROR_BODY).into_response();
        response.headers_mut().insert(
            HeaderName::from_static(ERROR_KIND_HEADER),
            HeaderValue::from_static(self.kind()),
        );
        response
    }
}

pub type Result<T, E = BridgeError> = std::result::Result<T, E>;
