//! Bounded bidirectional search.
//!
//! # Architecture Decisions
//!
//! - **Alternating frontiers**: each round expands whichever frontier is
//!   smaller (ties go forward). Expansion cost is frontier size times
//!   branching factor, so this keeps both trees shallow.
//!
//! - **Budgets**: a [`Budget`] (deadline + node counter) is checked at loop
//!   entry and before every frontier title. Exhaustion yields
//!   [`SearchOutcome::Unknown`], never `NotPossible`.
//!
//! - **First meeting wins**: the first title seen by both directions ends
//!   the search. Both trees are expanded by whole BFS layers, so the
//!   distance is deterministic even when the path is not.
//!
//! - **Cache**: optional, injected through [`SearchConfig`]. Cache
//!   operations are bounded by `CACHE_OP_TIMEOUT`; a slow or failing store
//!   is treated as a miss.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{timeout, Instant};
use tracing::{debug, instrument, warn};

use crate::blocklist::Blocklist;
use crate::cache::{CachedEntry, Lookup, PathCacheStatsSnapshot};
use crate::error::{DomainError, DomainResult};

use super::budget::Budget;
use super::config::{SearchConfig, SearchLimits, SearchProfile};
use super::expand::{expand, Direction, Expansion, VisitedMap};
use super::path::{distance_to_end, reconstruct_path};
use super::traits::LinkFetcher;
use super::types::SearchOutcome;

/// Timeout for cache operations (get/put).
/// The cache must never hold up a search; a timeout counts as "cache unavailable".
const CACHE_OP_TIMEOUT: Duration = Duration::from_millis(50);

/// One run of the bidirectional loop.
struct Traversal {
    outcome: SearchOutcome,
    /// Titles dropped after a failed link fetch.
    skipped_fetches: usize,
}

impl Traversal {
    /// Whether the outcome may be cached. `Unknown` is filtered by
    /// [`CachedEntry::from_outcome`]; a run that skipped titles saw only
    /// part of the graph, so neither its "no path" nor its distance holds.
    fn is_complete(&self) -> bool {
        self.skipped_fetches == 0
    }
}

/// Shortest-path finder over a lazily fetched link graph.
///
/// Holds no per-search state, so one finder serves any number of
/// concurrent searches.
pub struct PathFinder<F: ?Sized> {
    fetcher: Arc<F>,
    config: SearchConfig,
}

impl<F> PathFinder<F>
where
    F: LinkFetcher + ?Sized,
{
    /// Creates a path finder with the default configuration (no cache).
    pub fn new(fetcher: Arc<F>) -> Self {
        Self::with_config(fetcher, SearchConfig::default())
    }

    /// Creates a path finder with custom configuration.
    pub fn with_config(fetcher: Arc<F>, config: SearchConfig) -> Self {
        Self { fetcher, config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Lookup counters of the configured cache; all zero without one.
    pub fn cache_stats(&self) -> PathCacheStatsSnapshot {
        self.config
            .cache
            .as_ref()
            .map(|cache| cache.stats().snapshot())
            .unwrap_or_default()
    }

    /// Searches for a shortest path under a named profile.
    ///
    /// # Caching Behavior
    ///
    /// When a cache is configured:
    /// 1. Every profile reads it after the trivial `start == target` case
    /// 2. Only full and extended profiles write, and only outcomes of runs
    ///    that neither ran out of budget nor skipped a failed fetch
    /// 3. A failing or slow store is skipped, never fatal
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidTitle`] when an endpoint is empty after
    /// canonicalization. Every other failure degrades into the outcome.
    #[instrument(skip(self, profile), fields(profile = %profile))]
    pub async fn search(
        &self,
        start: &str,
        target: &str,
        profile: SearchProfile,
    ) -> DomainResult<SearchOutcome> {
        let start = self.canonical_title(start)?;
        let target = self.canonical_title(target)?;
        if start == target {
            return Ok(SearchOutcome::found(vec![start]));
        }

        let limits = self.config.limits_for(profile);

        if let Some(outcome) = self.cached(&start, &target, &limits).await {
            return Ok(outcome);
        }

        let traversal = self.run(&start, &target, &limits).await;

        if profile.writes_cache() {
            if traversal.is_complete() {
                self.store(&start, &target, &traversal.outcome, &limits)
                    .await;
            } else {
                debug!(
                    start = %start,
                    target = %target,
                    skipped_fetches = traversal.skipped_fetches,
                    "not caching result of a search that skipped titles"
                );
            }
        }

        Ok(traversal.outcome)
    }

    /// Searches with explicit limits, bypassing the cache.
    pub async fn search_with_limits(
        &self,
        start: &str,
        target: &str,
        limits: &SearchLimits,
    ) -> DomainResult<SearchOutcome> {
        let start = self.canonical_title(start)?;
        let target = self.canonical_title(target)?;
        Ok(self.run(&start, &target, limits).await.outcome)
    }

    /// Hops left from `title` to the end of a previously found `path`,
    /// matching `title` under the fetcher's canonicalization rules.
    ///
    /// Returns `None` when the title is not on the path.
    pub fn remaining_distance(&self, path: &[String], title: &str) -> Option<usize> {
        distance_to_end(path, &self.fetcher.canonicalize(title))
    }

    /// Canonicalizes a caller-supplied endpoint with the fetcher's rules.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidTitle`] when nothing is left of `raw`.
    pub fn canonical_title(&self, raw: &str) -> DomainResult<String> {
        let title = self.fetcher.canonicalize(raw);
        if title.is_empty() {
            return Err(DomainError::InvalidTitle {
                value: raw.to_string(),
            });
        }
        Ok(title)
    }

    async fn cached(
        &self,
        start: &str,
        target: &str,
        limits: &SearchLimits,
    ) -> Option<SearchOutcome> {
        let cache = self.config.cache.as_ref()?;

        match timeout(CACHE_OP_TIMEOUT, cache.get(start, target)).await {
            Ok(Ok(Some(entry))) if entry.answers(limits.max_depth) => {
                cache.stats().record(Lookup::Hit);
                debug!(start, target, "serving search from cache");
                Some(entry.into_outcome())
            }
            Ok(Ok(_)) => {
                cache.stats().record(Lookup::Miss);
                None
            }
            Ok(Err(err)) => {
                cache.stats().record(Lookup::Skip);
                warn!(start, target, error = %err, "cache lookup failed, searching instead");
                None
            }
            Err(_) => {
                cache.stats().record(Lookup::Skip);
                warn!(start, target, "cache lookup timed out, searching instead");
                None
            }
        }
    }

    async fn store(
        &self,
        start: &str,
        target: &str,
        outcome: &SearchOutcome,
        limits: &SearchLimits,
    ) {
        let (Some(cache), Some(entry)) = (
            self.config.cache.as_ref(),
            CachedEntry::from_outcome(outcome, limits.max_depth),
        ) else {
            return;
        };

        match timeout(CACHE_OP_TIMEOUT, cache.put(start, target, &entry)).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => warn!(start, target, error = %err, "failed to cache search result"),
            Err(_) => warn!(start, target, "caching search result timed out"),
        }
    }

    /// The bidirectional loop. `start` and `target` are canonical.
    async fn run(&self, start: &str, target: &str, limits: &SearchLimits) -> Traversal {
        if start == target {
            return Traversal {
                outcome: SearchOutcome::found(vec![start.to_string()]),
                skipped_fetches: 0,
            };
        }

        let started = Instant::now();
        let traversal = self.bidirectional(start, target, limits).await;
        let outcome = &traversal.outcome;
        let elapsed = started.elapsed();

        metrics::counter!("linkhop_search_outcomes_total", "outcome" => outcome.status())
            .increment(1);
        metrics::histogram!("linkhop_search_duration_seconds").record(elapsed.as_secs_f64());
        debug!(
            start,
            target,
            outcome = outcome.status(),
            distance = outcome.distance(),
            skipped_fetches = traversal.skipped_fetches,
            elapsed_ms = elapsed.as_millis() as u64,
            "search finished"
        );

        traversal
    }

    async fn bidirectional(
        &self,
        start: &str,
        target: &str,
        limits: &SearchLimits,
    ) -> Traversal {
        let blocklist = &self.config.blocklist;
        let mut budget = Budget::start(limits);
        let outcome = self
            .meet_in_the_middle(start, target, limits, blocklist, &mut budget)
            .await;
        Traversal {
            outcome,
            skipped_fetches: budget.skipped_fetches(),
        }
    }

    async fn meet_in_the_middle(
        &self,
        start: &str,
        target: &str,
        limits: &SearchLimits,
        blocklist: &Blocklist,
        budget: &mut Budget,
    ) -> SearchOutcome {
        let mut forward = vec![start.to_string()];
        let mut backward = vec![target.to_string()];
        let mut forward_visited = VisitedMap::from([(start.to_string(), None)]);
        let mut backward_visited = VisitedMap::from([(target.to_string(), None)]);
        let mut forward_depth = 0u32;
        let mut backward_depth = 0u32;

        while !forward.is_empty()
            && !backward.is_empty()
            && forward_depth + backward_depth < limits.max_depth
        {
            if let Err(exceeded) = budget.check() {
                return SearchOutcome::Unknown {
                    reason: exceeded.to_string(),
                };
            }

            let direction = if forward.len() <= backward.len() {
                Direction::Forward
            } else {
                Direction::Backward
            };

            let expansion = match direction {
                Direction::Forward => {
                    expand(
                        &*self.fetcher,
                        blocklist,
                        &forward,
                        &mut forward_visited,
                        &backward_visited,
                        budget,
                    )
                    .await
                }
                Direction::Backward => {
                    expand(
                        &*self.fetcher,
                        blocklist,
                        &backward,
                        &mut backward_visited,
                        &forward_visited,
                        budget,
                    )
                    .await
                }
            };

            match expansion {
                Expansion::Meeting(meeting) => {
                    debug!(%direction, %meeting, visited = budget.visited(), "frontiers met");
                    let path = reconstruct_path(&meeting, &forward_visited, &backward_visited);
                    return SearchOutcome::found(path);
                }
                Expansion::BudgetExceeded(exceeded) => {
                    debug!(%direction, visited = budget.visited(), %exceeded, "search budget exhausted");
                    return SearchOutcome::Unknown {
                        reason: exceeded.to_string(),
                    };
                }
                Expansion::Frontier(next) => match direction {
                    Direction::Forward => {
                        forward = next;
                        forward_depth += 1;
                    }
                    Direction::Backward => {
                        backward = next;
                        backward_depth += 1;
                    }
                },
            }
        }

        SearchOutcome::NotPossible {
            reason: format!("no path within {} hops", limits.max_depth),
        }
    }
}

/// Registers search metric descriptions.
pub fn register_search_metrics() {
    metrics::describe_counter!(
        "linkhop_search_outcomes_total",
        "Total number of completed searches by outcome"
    );
    metrics::describe_histogram!(
        "linkhop_search_duration_seconds",
        metrics::Unit::Seconds,
        "Wall-clock duration of searches that ran a traversal"
    );
}
