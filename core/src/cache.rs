//! Time-windowed in-memory cache
//!
//! Values are keyed by `(key, time_bucket)` where `time_bucket = floor(now / window)`, so a
//! cached value is naturally invalidated when the bucket changes. Entries also carry a
//! moka time-to-live of one window, which keeps at most the current and the previous bucket
//! alive per key.

use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{ApiError, Result};

/// Default number of live entries per cache
pub const DEFAULT_CACHE_CAPACITY: u64 = 16;

/// Coarse integer time bucket used as part of a cache key
pub fn time_bucket(now_secs: u64, window_secs: u64) -> u64 {
    now_secs / window_secs.max(1)
}

/// Concurrency-safe cache whose entries are valid for a single time window
///
/// Concurrent misses for the same key and bucket are coalesced: one caller runs the
/// initializer while the others wait for its result. A failed initializer caches nothing.
pub struct TimeWindowedCache<K, V> {
    window_secs: u64,
    entries: moka::future::Cache<(K, u64), V>,
}

impl<K, V> TimeWindowedCache<K, V>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(window_secs: u64) -> Self {
        Self::with_capacity(window_secs, DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_capacity(window_secs: u64, capacity: u64) -> Self {
        let window_secs = window_secs.max(1);
        Self {
            window_secs,
            entries: moka::future::Cache::builder()
                .max_capacity(capacity)
                .time_to_live(Duration::from_secs(window_secs))
                .build(),
        }
    }

    fn bucket(&self, now_secs: u64) -> u64 {
        time_bucket(now_secs, self.window_secs)
    }

    /// Return the value cached for the current bucket, or compute and cache it
    pub async fn get_or_try_insert_with<F>(&self, key: K, now_secs: u64, init: F) -> Result<V>
    where
        F: Future<Output = Result<V>>,
    {
        let bucket = self.bucket(now_secs);
        self.entries
            .try_get_with((key, bucket), init)
            .await
            .map_err(|e: Arc<ApiError>| (*e).clone())
    }

    #[cfg(test)]
    async fn get(&self, key: &K, now_secs: u64) -> Option<V> {
        self.entries
            .get(&(key.clone(), self.bucket(now_secs)))
            .await
    }

    #[cfg(test)]
    async fn insert(&self, key: K, now_secs: u64, value: V) {
        let bucket = self.bucket(now_secs);
        self.entries.insert((key, bucket), value).await;
    }

    /// Number of live entries after pending evictions are applied
    #[cfg(test)]
    async fn len(&self) -> u64 {
        self.entries.run_pending_tasks().await;
        self.entries.entry_count()
    }
}
