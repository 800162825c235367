//! In-process response cache with a fixed time-to-live.
//!
//! `ResponseCache` is a cheap handle over shared state: construct one at
//! startup and hand clones to whoever needs it. There is no per-key
//! locking, so concurrent misses on one key each run the full pipeline and
//! the last write wins.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration as StdDuration;

use axum::body::Bytes;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tokio::task::JoinHandle;

/// Default entry lifetime: two hours.
pub const DEFAULT_TTL_SECS: i64 = 2 * 60 * 60;

/// Source of the current time, swappable in tests.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A stored response.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedResponse {
    pub content_type: Option<String>,
    pub body: Bytes,
}

#[derive(Debug)]
struct CacheEntry {
    response: CachedResponse,
    expires_at: DateTime<Utc>,
}

/// Counters reported by `/api/cache-stats`. `ksize`/`vsize` are the summed
/// byte lengths of live keys and bodies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub keys: usize,
    pub ksize: usize,
    pub vsize: usize,
}

#[derive(Debug, Default)]
struct Store {
    entries: HashMap<String, CacheEntry>,
    hits: u64,
    misses: u64,
}

impl Store {
    // ---
    fn sweep(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        before - self.entries.len()
    }

    fn evict_soonest(&mut self) {
        let victim = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.expires_at)
            .map(|(key, _)| key.clone());

        if let Some(key) = victim {
            tracing::debug!("cache full, evicting {}", key);
            self.entries.remove(&key);
        }
    }
}

#[derive(Clone)]
pub struct ResponseCache {
    // ---
    store: Arc<Mutex<Store>>,
    ttl: Duration,
    max_keys: Option<usize>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache")
            .field("ttl", &self.ttl)
            .field("max_keys", &self.max_keys)
            .finish_non_exhaustive()
    }
}

impl ResponseCache {
    // ---
    pub fn new(ttl: Duration, max_keys: Option<usize>) -> Self {
        Self::with_clock(ttl, max_keys, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, max_keys: Option<usize>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store: Arc::new(Mutex::new(Store::default())),
            ttl,
            max_keys,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Look up a live entry, counting the hit or miss.
    pub fn get(&self, key: &str) -> Option<CachedResponse> {
        // ---
        let now = self.clock.now();
        let mut store = self.lock();

        let found = store
            .entries
            .get(key)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.response.clone());

        match found {
            Some(response) => {
                store.hits += 1;
                Some(response)
            }
            None => {
                store.misses += 1;
                None
            }
        }
    }

    /// Store `response` under `key`, expiring one TTL from now.
    pub fn put(&self, key: impl Into<String>, response: CachedResponse) {
        // ---
        let key = key.into();
        let now = self.clock.now();
        let mut store = self.lock();

        if let Some(max) = self.max_keys {
            if !store.entries.contains_key(&key) && store.entries.len() >= max {
                store.sweep(now);
                while store.entries.len() >= max && !store.entries.is_empty() {
                    store.evict_soonest();
                }
            }
            if max == 0 {
                return;
            }
        }

        store.entries.insert(
            key,
            CacheEntry {
                response,
                expires_at: now + self.ttl,
            },
        );
    }

    /// Drop expired entries; returns how many were removed.
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        self.lock().sweep(now)
    }

    pub fn stats(&self) -> CacheStats {
        // ---
        let now = self.clock.now();
        let store = self.lock();
        let live = store.entries.iter().filter(|(_, e)| e.expires_at > now);

        let (keys, ksize, vsize) = live.fold((0, 0, 0), |(n, k, v), (key, entry)| {
            (n + 1, k + key.len(), v + entry.response.body.len())
        });

        CacheStats {
            hits: store.hits,
            misses: store.misses,
            keys,
            ksize,
            vsize,
        }
    }

    /// Spawn a background task calling [`sweep`](Self::sweep) every `period`.
    pub fn spawn_sweeper(&self, period: StdDuration) -> JoinHandle<()> {
        // ---
        let cache = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                let removed = cache.sweep();
                if removed > 0 {
                    tracing::debug!("cache sweep removed {} expired entries", removed);
                }
            }
        })
    }
}
