//! Response-cache middleware for the Ember endpoint.
//!
//! Keyed by path plus query string. Hits replay the stored body and content
//! type; misses run the handler and store its body when the status is 2xx.

use axum::{
    body::{self, Body},
    extract::{Request, State},
    http::{header::CONTENT_TYPE, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{error, info};

use crate::cache::{CachedResponse, ResponseCache};
use crate::error::INTERNAL_ERROR_BODY;

pub async fn cache_responses(
    State(cache): State<ResponseCache>,
    request: Request,
    next: Next,
) -> Response {
    // ---
    let key = request
        .uri()
        .path_and_query()
        .map_or_else(|| request.uri().path().to_string(), |pq| pq.as_str().to_string());

    if let Some(hit) = cache.get(&key) {
        info!("cache hit for: {}", key);
        return replay(hit);
    }
    info!("cache miss for: {}", key);

    let response = next.run(request).await;
    if !response.status().is_success() {
        return response;
    }

    let (parts, inner) = response.into_parts();
    let bytes = match body::to_bytes(inner, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("Failed to buffer response for {}: {}", key, e);
            return (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_BODY).into_response();
        }
    };

    let content_type = parts
        .headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    cache.put(
        key,
        CachedResponse {
            content_type,
            body: bytes.clone(),
        },
    );

    Response::from_parts(parts, Body::from(bytes))
}

fn replay(hit: CachedResponse) -> Response {
    // ---
    let mut response = Response::new(Body::from(hit.body));
    if let Some(value) = hit
        .content_type
        .and_then(|ct| HeaderValue::from_str(&ct).ok())
    {
        response.headers_mut().insert(CONTENT_TYPE, value);
    }
    response
}
