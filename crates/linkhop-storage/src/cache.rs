//! In-process cache store with per-entry TTL.
//!
//! Backs [`PathCache`](linkhop_domain::PathCache) with Moka's async cache
//! when no shared store is deployed. Entries expire after the TTL given to
//! each `put`, and the cache is bounded by entry count.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;
use tracing::trace;

use linkhop_domain::{CacheStore, DomainResult};

/// Default maximum number of entries.
pub const DEFAULT_MAX_CAPACITY: u64 = 100_000;

#[derive(Debug, Clone)]
struct StoredValue {
    payload: String,
    ttl: Duration,
}

/// Expires every entry after the TTL it was written with.
struct PerEntryTtl;

impl Expiry<String, StoredValue> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &StoredValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &StoredValue,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Moka-backed implementation of [`CacheStore`].
///
/// # Thread Safety
///
/// Fully thread-safe; share one instance across tasks through `Arc`.
#[derive(Clone)]
pub struct MemoryCacheStore {
    cache: Cache<String, StoredValue>,
    max_capacity: u64,
}

impl std::fmt::Debug for MemoryCacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCacheStore")
            .field("max_capacity", &self.max_capacity)
            .field("entry_count", &self.cache.entry_count())
            .finish()
    }
}

impl Default for MemoryCacheStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CAPACITY)
    }
}

impl MemoryCacheStore {
    /// Creates a store holding at most `max_capacity` entries.
    pub fn new(max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(PerEntryTtl)
            .build();
        Self {
            cache,
            max_capacity,
        }
    }

    /// Returns the approximate number of entries.
    ///
    /// Call [`run_pending_tasks`](Self::run_pending_tasks) first for an
    /// up-to-date count.
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Flushes Moka's pending maintenance (evictions, expirations).
    pub async fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks().await;
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.cache.invalidate_all();
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> DomainResult<Option<String>> {
        Ok(self.cache.get(key).await.map(|value| value.payload))
    }

    async fn put(&self, key: &str, value: String, ttl: Duration) -> DomainResult<()> {
        trace!(key, ttl_secs = ttl.as_secs(), "caching value in memory");
        self.cache
            .insert(
                key.to_string(),
                StoredValue {
                    payload: value,
                    ttl,
                },
            )
            .await;
        Ok(())
    }

    async fn remove(&self, key: &str) -> DomainResult<()> {
        self.cache.invalidate(key).await;
        Ok(())
    }
}
