//! Ember bridge: fetches electricity generation and emissions data from the
//! Ember API, reshapes it into per-fuel-tech time series and serves it over a
//! cached HTTP endpoint.
//!
//! Data flow for `/v4/ember/{code}/{period}.json`:
//! cache lookup → (miss) [`fetch::Fetcher`] → [`upstream::EmberClient`] per
//! metric type → [`pipeline`] stages → [`render`] → cache store.

use anyhow::{anyhow, Result};

pub mod cache;
pub mod config;
pub mod countries;
pub mod error;
pub mod fetch;
pub mod models;
pub mod pipeline;
pub mod render;
pub mod routes;
pub mod snapshot;
pub mod upstream;

pub use config::Config;
pub use error::BridgeError;
pub use models::{HistoryRecord, MetricType, Period, ResultBundle};
pub use routes::{router, AppState};

use cache::ResponseCache;
use countries::Registry;
use fetch::Fetcher;
use snapshot::SnapshotWriter;
use upstream::EmberClient;

// ---

/// Assemble the shared application state from configuration.
///
/// Fails if the fuel-tech rename table does not cover every requested
/// upstream series, or if the embedded registry cannot be parsed.
pub fn build_state(cfg: &Config) -> Result<AppState> {
    // ---
    pipeline::verify_rename_table().map_err(|missing| {
        anyhow!(
            "No fuel-tech mapping for upstream series: {}",
            missing.join(", ")
        )
    })?;

    let registry =
        Registry::embedded().map_err(|e| anyhow!("Failed to load country registry: {}", e))?;
    tracing::info!("Loaded {} countries and regions", registry.entities().len());

    let ttl_secs = i64::try_from(cfg.cache_ttl_secs)
        .map_err(|_| anyhow!("Invalid CACHE_TTL_SECS: {}", cfg.cache_ttl_secs))?;
    let cache = ResponseCache::new(chrono::Duration::seconds(ttl_secs), cfg.cache_max_keys);

    let client = EmberClient::new(&cfg.api_url, &cfg.api_key);
    let snapshots = cfg.output_dir.as_ref().map(SnapshotWriter::new);

    Ok(AppState::new(
        Fetcher::new(client, snapshots),
        registry,
        cache,
    ))
}
