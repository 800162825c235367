//! Configuration loader for the `ember-bridge` service.
//!
//! This module centralizes all runtime configuration values and their defaults,
//! loading from environment variables (with optional `.env` file support
//! provided by the caller), so `env::var` calls stay out of the rest of the
//! codebase.
use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Result};

/// Default upstream base URL.
pub const DEFAULT_API_URL: &str = "https://api.ember-energy.org";

/// Parse an optional numeric environment variable with a default value.
macro_rules! parse_env {
    ($var_name:expr, $ty:ty, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<$ty>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Parse a required string environment variable.
macro_rules! require_env {
    ($var_name:expr) => {
        env::var($var_name)
            .map_err(|_| anyhow!("{} must be set in .env or environment", $var_name))?
    };
}

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// Ember API key sent with every upstream request.
    pub api_key: String,

    /// Ember API base URL.
    pub api_url: String,

    /// HTTP listen port.
    pub port: u16,

    /// Response cache time-to-live, in seconds.
    pub cache_ttl_secs: u64,

    /// Interval between expired-entry sweeps, in seconds.
    pub cache_check_period_secs: u64,

    /// Maximum number of cached responses (`None` = unbounded).
    pub cache_max_keys: Option<usize>,

    /// Root directory for debugging snapshots (`None` = disabled).
    pub output_dir: Option<PathBuf>,
}

/// Load configuration from environment variables with defaults.
///
/// Required:
/// - `EMBER_API_KEY` – Ember API key
///
/// Optional:
/// - `EMBER_API_URL` – upstream base URL (default: `https://api.ember-energy.org`)
/// - `PORT` – listen port (default: 3000)
/// - `CACHE_TTL_SECS` – cache entry lifetime (default: 7200)
/// - `CACHE_CHECK_PERIOD_SECS` – expiry sweep interval (default: 600)
/// - `CACHE_MAX_KEYS` – cache capacity (default: unbounded)
/// - `OUTPUT_DIR` – snapshot directory (default: snapshots disabled)
///
/// Returns an error if any required variable is missing or invalid.
pub fn load_from_env() -> Result<Config> {
    // ---
    let api_key = require_env!("EMBER_API_KEY");
    let api_url = env::var("EMBER_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
    let port = parse_env!("PORT", u16, 3000);
    let cache_ttl_secs = parse_env!("CACHE_TTL_SECS", u64, 7200);
    let cache_check_period_secs = parse_env!("CACHE_CHECK_PERIOD_SECS", u64, 600);
    let cache_max_keys = env::var("CACHE_MAX_KEYS")
        .ok()
        .map(|v| v.parse::<usize>())
        .transpose()
        .map_err(|e| anyhow!("Invalid CACHE_MAX_KEYS: {}", e))?;
    let output_dir = env::var("OUTPUT_DIR")
        .ok()
        .filter(|v| !v.is_empty())
        .map(PathBuf::from);

    if cache_check_period_secs == 0 {
        return Err(anyhow!("Invalid CACHE_CHECK_PERIOD_SECS: must be positive"));
    }

    Ok(Config {
        api_key,
        api_url,
        port,
        cache_ttl_secs,
        cache_check_period_secs,
        cache_max_keys,
        output_dir,
    })
}

impl Config {
    /// Log the loaded configuration for debugging purposes.
    ///
    /// Masks the API key while showing all other configuration values.
    pub fn log_config(&self) {
        // ---
        let max_keys = self
            .cache_max_keys
            .map_or_else(|| "unbounded".to_string(), |n| n.to_string());
        let output_dir = self
            .output_dir
            .as_ref()
            .map_or_else(|| "disabled".to_string(), |p| p.display().to_string());

        tracing::info!("Configuration loaded:");
        tracing::info!("  EMBER_API_KEY           : {}", mask_secret(&self.api_key));
        tracing::info!("  EMBER_API_URL           : {}", self.api_url);
        tracing::info!("  PORT                    : {}", self.port);
        tracing::info!("  CACHE_TTL_SECS          : {}", self.cache_ttl_secs);
        tracing::info!("  CACHE_CHECK_PERIOD_SECS : {}", self.cache_check_period_secs);
        tracing::info!("  CACHE_MAX_KEYS          : {}", max_keys);
        tracing::info!("  OUTPUT_DIR              : {}", output_dir);
    }
}

/// Keep the first four characters of a secret and mask the rest.
fn mask_secret(secret: &str) -> String {
    // ---
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("{}****", visible)
    }
}
