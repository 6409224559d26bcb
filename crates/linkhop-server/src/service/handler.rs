//! Search service implementation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info, instrument};

use linkhop_domain::{
    CacheStore, DomainResult, LinkFetcher, PathFinder, SearchOutcome, SearchProfile,
};
use linkhop_storage::MemoryCacheStore;

use crate::config::LinkhopConfig;

use super::singleflight::{Singleflight, SingleflightGuard, SingleflightSlot};
use super::types::{
    BatchSearchError, BatchSearchItemResult, BatchSearchResult, SearchRequest, MAX_BATCH_SIZE,
};

/// Key for identifying identical searches (canonical endpoints).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct SearchKey {
    pub start: String,
    pub target: String,
    pub profile: SearchProfile,
}

/// Entry point for callers that need shortest paths.
///
/// Wraps a [`PathFinder`] with two layers of deduplication:
/// 1. Intra-batch: identical searches within a batch run once
/// 2. Singleflight: concurrent identical searches share one traversal
///
/// Caching happens inside the finder, under the singleflight, so a burst of
/// identical requests costs at most one cache lookup and one traversal.
pub struct SearchService<F: ?Sized> {
    finder: Arc<PathFinder<F>>,
    singleflight: Arc<Singleflight<SearchKey, SearchOutcome>>,
    shared: AtomicU64,
}

impl<F> SearchService<F>
where
    F: LinkFetcher + ?Sized,
{
    /// Creates a service around an existing finder.
    pub fn new(finder: Arc<PathFinder<F>>) -> Self {
        Self {
            finder,
            singleflight: Arc::new(Singleflight::new()),
            shared: AtomicU64::new(0),
        }
    }

    /// Builds a finder from `config`, backed by an in-process cache store
    /// when `cache.enabled` is set.
    pub fn from_config(fetcher: Arc<F>, config: &LinkhopConfig) -> Self {
        let store = config.cache.enabled.then(|| {
            Arc::new(MemoryCacheStore::new(config.cache.max_capacity)) as Arc<dyn CacheStore>
        });
        Self::with_cache_store(fetcher, config, store)
    }

    /// Builds a finder from `config` with a caller-provided cache store.
    pub fn with_cache_store(
        fetcher: Arc<F>,
        config: &LinkhopConfig,
        store: Option<Arc<dyn CacheStore>>,
    ) -> Self {
        let search_config = config.search_config(store);
        info!(
            cache = search_config.cache.is_some(),
            blocked_titles = search_config.blocklist.len(),
            "search service configured"
        );
        Self::new(Arc::new(PathFinder::with_config(fetcher, search_config)))
    }

    pub fn finder(&self) -> &PathFinder<F> {
        &self.finder
    }

    /// Number of searches answered with another caller's traversal.
    pub fn shared_results(&self) -> u64 {
        self.shared.load(Ordering::Relaxed)
    }

    /// Number of distinct searches currently running.
    pub fn in_flight(&self) -> usize {
        self.singleflight.in_flight()
    }

    /// Runs one search.
    ///
    /// # Errors
    ///
    /// Returns [`linkhop_domain::DomainError::InvalidTitle`] when an endpoint is empty after
    /// canonicalization.
    #[instrument(skip(self, profile), fields(profile = %profile))]
    pub async fn search(
        &self,
        start: &str,
        target: &str,
        profile: SearchProfile,
    ) -> DomainResult<SearchOutcome> {
        let key = SearchKey {
            start: self.finder.canonical_title(start)?,
            target: self.finder.canonical_title(target)?,
            profile,
        };
        self.search_with_singleflight(key).await
    }

    /// Runs one search described by a request.
    pub async fn search_request(&self, request: &SearchRequest) -> DomainResult<SearchOutcome> {
        self.search(&request.start, &request.target, request.profile)
            .await
    }

    /// Validates a batch of searches.
    pub fn validate(&self, requests: &[SearchRequest]) -> BatchSearchResult<()> {
        if requests.is_empty() {
            return Err(BatchSearchError::EmptyBatch);
        }

        if requests.len() > MAX_BATCH_SIZE {
            return Err(BatchSearchError::BatchTooLarge {
                size: requests.len(),
                max: MAX_BATCH_SIZE,
            });
        }

        for (index, request) in requests.iter().enumerate() {
            self.key_for(request)
                .map_err(|e| BatchSearchError::InvalidSearch {
                    index,
                    message: e.to_string(),
                })?;
        }

        Ok(())
    }

    /// Runs a batch of searches concurrently.
    ///
    /// Results are returned in the same order as the requests.
    pub async fn search_batch(
        &self,
        requests: &[SearchRequest],
    ) -> BatchSearchResult<Vec<BatchSearchItemResult>> {
        self.validate(requests)?;

        // Stage 1: intra-batch deduplication
        let mut unique_keys: Vec<SearchKey> = Vec::new();
        let mut key_to_index: HashMap<SearchKey, usize> = HashMap::new();
        let mut position_to_unique: Vec<usize> = Vec::with_capacity(requests.len());

        for request in requests {
            let key = self.key_for(request).map_err(|e| BatchSearchError::InvalidSearch {
                index: position_to_unique.len(),
                message: e.to_string(),
            })?;
            let unique_index = *key_to_index.entry(key.clone()).or_insert_with(|| {
                unique_keys.push(key);
                unique_keys.len() - 1
            });
            position_to_unique.push(unique_index);
        }
        debug!(
            total = requests.len(),
            unique = unique_keys.len(),
            "running search batch"
        );

        // Stage 2: cross-request deduplication
        let unique_results: Vec<BatchSearchItemResult> = join_all(
            unique_keys
                .into_iter()
                .map(|key| self.search_with_singleflight(key)),
        )
        .await
        .into_iter()
        .map(|result| match result {
            Ok(outcome) => BatchSearchItemResult {
                outcome: Some(outcome),
                error: None,
            },
            Err(e) => BatchSearchItemResult {
                outcome: None,
                error: Some(e.to_string()),
            },
        })
        .collect();

        Ok(position_to_unique
            .iter()
            .map(|&idx| unique_results[idx].clone())
            .collect())
    }

    /// Returns (total searches, unique searches) for a batch.
    pub fn dedup_stats(&self, requests: &[SearchRequest]) -> (usize, usize) {
        let unique = requests
            .iter()
            .filter_map(|request| self.key_for(request).ok())
            .collect::<std::collections::HashSet<_>>();
        (requests.len(), unique.len())
    }

    fn key_for(&self, request: &SearchRequest) -> DomainResult<SearchKey> {
        Ok(SearchKey {
            start: self.finder.canonical_title(&request.start)?,
            target: self.finder.canonical_title(&request.target)?,
            profile: request.profile,
        })
    }

    /// Runs a search, or waits for an identical one already running.
    ///
    /// A leader that fails broadcasts nothing; its followers see the channel
    /// close and retry, so each caller gets its own error.
    async fn search_with_singleflight(&self, key: SearchKey) -> DomainResult<SearchOutcome> {
        match self.singleflight.acquire(key.clone()) {
            SingleflightSlot::Follower(mut receiver) => match receiver.recv().await {
                Ok(outcome) => {
                    self.shared.fetch_add(1, Ordering::Relaxed);
                    metrics::counter!("linkhop_search_shared_total").increment(1);
                    Ok(outcome)
                }
                // Leader dropped or failed; the guard already released the key.
                Err(_) => Box::pin(self.search_with_singleflight(key)).await,
            },
            SingleflightSlot::Leader(sender) => {
                let guard = SingleflightGuard::new(&self.singleflight, key.clone());

                let result = self
                    .finder
                    .search(&key.start, &key.target, key.profile)
                    .await;

                if let Ok(outcome) = &result {
                    // No receivers is fine.
                    let _ = sender.send(outcome.clone());
                }
                guard.complete();

                result
            }
        }
    }
}

/// Registers service metric descriptions.
pub fn register_service_metrics() {
    metrics::describe_counter!(
        "linkhop_search_shared_total",
        "Total number of searches answered by a concurrent identical search"
    );
}
