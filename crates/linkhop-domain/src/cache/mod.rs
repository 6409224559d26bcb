//! Search result caching over an external key-value store.
//!
//! The store itself (Redis, an in-process Moka cache, ...) is owned by the
//! caller and reached through [`CacheStore`]. [`PathCache`] is the adapter
//! the path finder talks to: it builds keys, encodes entries as JSON, and
//! refuses to serve entries that no longer hold.
//!
//! # Key Design
//!
//! Keys are the ordered `(start, target)` pair. They are not symmetrized:
//! the backward half of the search approximates incoming links with
//! outgoing ones, so the path discovered for `(a, b)` is not necessarily
//! the reverse of the one for `(b, a)`. Article titles cannot contain `|`,
//! which makes it a safe separator.
//!
//! # Staleness
//!
//! Entries expire through the store's TTL. On top of that, an entry whose
//! path runs through a title that is blocked *now* is evicted on read, so
//! extending the blocklist takes effect without flushing the store.
//!
//! # Write Policy
//!
//! The adapter writes whatever it is given; the path finder only hands it
//! results from profiles that may write (see
//! [`crate::search::SearchProfile::writes_cache`]), never `Unknown`
//! outcomes, and nothing from a run that skipped a failed fetch.
//!
//! # Example
//!
//! ```rust,ignore
//! use linkhop_domain::cache::{PathCache, PathCacheConfig};
//!
//! let cache = PathCache::new(store, blocklist, PathCacheConfig::default());
//! cache.put("Cat", "Biology", &entry).await?;
//! assert_eq!(cache.get("Cat", "Biology").await?, Some(entry));
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::blocklist::Blocklist;
use crate::error::DomainResult;
use crate::search::SearchOutcome;

/// External key-value store with TTL expiry.
///
/// Implementations must tolerate concurrent readers and writers;
/// concurrent writes to one key are last-writer-wins.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns the raw value for `key`, or `None` if absent or expired.
    async fn get(&self, key: &str) -> DomainResult<Option<String>>;

    /// Stores `value` under `key` for `ttl`.
    async fn put(&self, key: &str, value: String, ttl: Duration) -> DomainResult<()>;

    /// Removes `key` if present.
    async fn remove(&self, key: &str) -> DomainResult<()>;
}

/// Whether a cached search proved a path or proved there is none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CachedStatus {
    Possible,
    NotPossible,
}

/// A memoized search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedEntry {
    pub status: CachedStatus,
    /// Hops from start to target; `None` for `NotPossible`.
    pub distance: Option<usize>,
    /// The discovered path; empty for `NotPossible`.
    pub path: Vec<String>,
    /// Depth limit the result was computed under.
    pub max_depth: u32,
}

impl CachedEntry {
    /// Converts a search outcome into a cacheable entry.
    ///
    /// `Unknown` outcomes are not cacheable.
    pub fn from_outcome(outcome: &SearchOutcome, max_depth: u32) -> Option<Self> {
        match outcome {
            SearchOutcome::Possible { distance, path } => Some(Self {
                status: CachedStatus::Possible,
                distance: Some(*distance),
                path: path.clone(),
                max_depth,
            }),
            SearchOutcome::NotPossible { .. } => Some(Self {
                status: CachedStatus::NotPossible,
                distance: None,
                path: Vec::new(),
                max_depth,
            }),
            SearchOutcome::Unknown { .. } => None,
        }
    }

    /// Whether this entry answers a search limited to `max_depth` hops.
    ///
    /// A found path answers any request. "No path within N hops" says
    /// nothing about deeper searches.
    pub fn answers(&self, max_depth: u32) -> bool {
        match self.status {
            CachedStatus::Possible => true,
            CachedStatus::NotPossible => max_depth <= self.max_depth,
        }
    }

    pub fn into_outcome(self) -> SearchOutcome {
        match self.status {
            CachedStatus::Possible => SearchOutcome::found(self.path),
            CachedStatus::NotPossible => SearchOutcome::NotPossible {
                reason: format!("no path within {} hops", self.max_depth),
            },
        }
    }

    /// Structural check against the key the entry was stored under.
    fn is_well_formed(&self, start: &str, target: &str) -> bool {
        match self.status {
            CachedStatus::Possible => {
                self.path.first().map(String::as_str) == Some(start)
                    && self.path.last().map(String::as_str) == Some(target)
                    && self.distance == Some(self.path.len() - 1)
            }
            CachedStatus::NotPossible => self.distance.is_none() && self.path.is_empty(),
        }
    }

    /// Whether an intermediate title of the path is blocked.
    ///
    /// Endpoints are exempt: they are part of the key, chosen by the
    /// caller, and may legitimately be blocked titles.
    fn crosses_blocked(&self, blocklist: &Blocklist) -> bool {
        let len = self.path.len();
        len > 2
            && self.path[1..len - 1]
                .iter()
                .any(|title| blocklist.is_blocked(title))
    }
}

/// Configuration for the path cache adapter.
#[derive(Debug, Clone)]
pub struct PathCacheConfig {
    /// TTL handed to the store on every write.
    pub ttl: Duration,
    /// Prefix for every key, to share a store with other data.
    pub key_prefix: String,
}

impl Default for PathCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(24 * 60 * 60),
            key_prefix: "linkhop:path".to_string(),
        }
    }
}

impl PathCacheConfig {
    /// Sets the TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Sets the key prefix.
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }
}

/// How one cache lookup by the path finder ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// A usable entry answered the search.
    Hit,
    /// No entry, or one that does not answer the requested depth.
    Miss,
    /// The store failed or timed out; the search ran uncached.
    Skip,
}

/// Lookup and eviction counters of one [`PathCache`].
///
/// Lookups are recorded by the path finder, the only caller that knows
/// whether an entry answers the requested depth. Evictions are recorded by
/// the adapter. Counters are shared by every finder using the adapter.
#[derive(Debug, Default)]
pub struct PathCacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    skips: AtomicU64,
    evictions: AtomicU64,
}

impl PathCacheStats {
    pub fn record(&self, lookup: Lookup) {
        let counter = match lookup {
            Lookup::Hit => &self.hits,
            Lookup::Miss => &self.misses,
            Lookup::Skip => &self.skips,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> PathCacheStatsSnapshot {
        PathCacheStatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            skips: self.skips.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`PathCacheStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PathCacheStatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub skips: u64,
    /// Entries dropped on read as malformed or crossing a blocked title.
    pub evictions: u64,
}

impl PathCacheStatsSnapshot {
    /// Share of answered lookups served from the cache. Skips are excluded.
    pub fn hit_ratio(&self) -> f64 {
        match self.hits + self.misses {
            0 => 0.0,
            answered => self.hits as f64 / answered as f64,
        }
    }
}

/// Cache adapter for search results.
///
/// Shared across concurrent searches. Its only mutable state is
/// [`PathCacheStats`].
pub struct PathCache {
    store: Arc<dyn CacheStore>,
    blocklist: Arc<Blocklist>,
    config: PathCacheConfig,
    stats: PathCacheStats,
}

impl fmt::Debug for PathCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathCache")
            .field("config", &self.config)
            .field("blocked_titles", &self.blocklist.len())
            .finish()
    }
}

impl PathCache {
    /// Creates an adapter over `store`, validating reads against `blocklist`.
    pub fn new(
        store: Arc<dyn CacheStore>,
        blocklist: Arc<Blocklist>,
        config: PathCacheConfig,
    ) -> Self {
        Self {
            store,
            blocklist,
            config,
            stats: PathCacheStats::default(),
        }
    }

    pub fn config(&self) -> &PathCacheConfig {
        &self.config
    }

    pub fn stats(&self) -> &PathCacheStats {
        &self.stats
    }

    /// Store key for the ordered pair.
    pub fn key(&self, start: &str, target: &str) -> String {
        format!("{}:{}|{}", self.config.key_prefix, start, target)
    }

    /// Looks up the entry for `(start, target)`.
    ///
    /// Entries that are malformed or whose path crosses a now-blocked
    /// title are evicted and reported as absent. Store failures and
    /// undecodable values are returned as errors for the caller to treat
    /// as a miss.
    ///
    /// # Metrics
    ///
    /// - `linkhop_path_cache_hits_total` - incremented on a usable entry
    /// - `linkhop_path_cache_misses_total` - incremented when absent
    /// - `linkhop_path_cache_invalidations_total` - incremented on eviction
    pub async fn get(&self, start: &str, target: &str) -> DomainResult<Option<CachedEntry>> {
        let key = self.key(start, target);

        let Some(raw) = self.store.get(&key).await? else {
            metrics::counter!("linkhop_path_cache_misses_total").increment(1);
            return Ok(None);
        };
        let entry: CachedEntry = serde_json::from_str(&raw)?;

        if !entry.is_well_formed(start, target) {
            warn!(%key, "evicting malformed cache entry");
            self.evict(&key).await;
            return Ok(None);
        }
        if entry.crosses_blocked(&self.blocklist) {
            debug!(%key, "evicting cache entry that crosses a blocked title");
            self.evict(&key).await;
            return Ok(None);
        }

        metrics::counter!("linkhop_path_cache_hits_total").increment(1);
        Ok(Some(entry))
    }

    /// Writes the entry for `(start, target)` with the configured TTL.
    pub async fn put(&self, start: &str, target: &str, entry: &CachedEntry) -> DomainResult<()> {
        let key = self.key(start, target);
        let value = serde_json::to_string(entry)?;
        self.store.put(&key, value, self.config.ttl).await
    }

    /// Best-effort removal; a failure only leaves the entry to its TTL.
    async fn evict(&self, key: &str) {
        self.stats.record_eviction();
        metrics::counter!("linkhop_path_cache_invalidations_total").increment(1);
        if let Err(err) = self.store.remove(key).await {
            warn!(%key, error = %err, "failed to evict cache entry");
        }
    }
}

/// Registers path cache metric descriptions.
///
/// Call once during startup; optional, but gives exporters help text.
pub fn register_path_cache_metrics() {
    metrics::describe_counter!(
        "linkhop_path_cache_hits_total",
        "Total number of usable path cache entries served"
    );
    metrics::describe_counter!(
        "linkhop_path_cache_misses_total",
        "Total number of path cache lookups with no entry"
    );
    metrics::describe_counter!(
        "linkhop_path_cache_invalidations_total",
        "Total number of path cache entries evicted on read"
    );
}
