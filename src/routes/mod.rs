//! HTTP routing gateway.
//!
//! Each sibling module exports a sub-router; this gateway merges them,
//! wraps the Ember endpoint in the response cache and attaches the shared
//! state, so `main.rs` never needs to know about individual endpoints.

use std::sync::Arc;

use axum::{middleware, Router};

use crate::cache::ResponseCache;
use crate::countries::Registry;
use crate::fetch::Fetcher;

mod cache_layer;
mod cache_stats;
mod countries;
mod ember;
mod health;

/// State shared by every handler. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct AppState {
    // ---
    pub fetcher: Arc<Fetcher>,
    pub registry: Arc<Registry>,
    pub cache: ResponseCache,
}

impl AppState {
    pub fn new(fetcher: Fetcher, registry: Registry, cache: ResponseCache) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            registry: Arc::new(registry),
            cache,
        }
    }
}

// ---

pub fn router(state: AppState) -> Router {
    // ---
    let cached_ember = ember::router().route_layer(middleware::from_fn_with_state(
        state.cache.clone(),
        cache_layer::cache_responses,
    ));

    Router::new()
        .merge(cached_ember)
        .merge(countries::router())
        .merge(cache_stats::router())
        .merge(health::router())
        .with_state(state)
}
