//! Path finder test suite.
//!
//! Most graphs here are built symmetric with `undirected`, because the
//! backward half of the search expands target-side titles through their
//! outgoing links.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::mocks::{MockCacheStore, MockLinkFetcher};
use crate::blocklist::Blocklist;
use crate::cache::{CachedEntry, PathCache, PathCacheConfig};
use crate::error::{DomainError, DomainResult};
use crate::search::{
    remaining_distance, LinkFetcher, PathFinder, SearchConfig, SearchLimits, SearchOutcome,
    SearchProfile,
};

fn limits(max_depth: u32) -> SearchLimits {
    SearchLimits::new(max_depth, 10_000, Duration::from_secs(60))
}

/// Adds every edge in both directions.
async fn undirected(edges: &[(&str, &str)]) -> MockLinkFetcher {
    let fetcher = MockLinkFetcher::new();
    for (a, b) in edges {
        fetcher.add_links(a, &[*b]).await;
        fetcher.add_links(b, &[*a]).await;
    }
    fetcher
}

/// Graph with a unique shortest path A-C-G-F of length 3.
async fn diamond_graph() -> MockLinkFetcher {
    undirected(&[
        ("A", "B"),
        ("A", "C"),
        ("B", "D"),
        ("C", "D"),
        ("D", "E"),
        ("E", "F"),
        ("C", "G"),
        ("G", "F"),
    ])
    .await
}

fn path(nodes: &[&str]) -> Vec<String> {
    nodes.iter().map(|n| n.to_string()).collect()
}

/// Asserts the structural invariants of a `Possible` outcome.
async fn assert_valid_path(
    outcome: &SearchOutcome,
    start: &str,
    target: &str,
    fetcher: &MockLinkFetcher,
) {
    let SearchOutcome::Possible { distance, path } = outcome else {
        panic!("expected a path, got {outcome:?}");
    };
    assert_eq!(*distance, path.len() - 1);
    assert_eq!(path.first().map(String::as_str), Some(start));
    assert_eq!(path.last().map(String::as_str), Some(target));

    let mut seen = std::collections::HashSet::new();
    for title in path {
        assert!(seen.insert(title.clone()), "{title} repeats in {path:?}");
    }

    for pair in path.windows(2) {
        let forward = fetcher.outgoing_links(&pair[0]).await.unwrap();
        let backward = fetcher.outgoing_links(&pair[1]).await.unwrap();
        assert!(
            forward.contains(&pair[1]) || backward.contains(&pair[0]),
            "{} -> {} is not a link",
            pair[0],
            pair[1]
        );
    }
}

fn cached_finder(
    fetcher: Arc<MockLinkFetcher>,
    store: Arc<MockCacheStore>,
) -> PathFinder<MockLinkFetcher> {
    let blocklist = Arc::new(Blocklist::new());
    let cache = PathCache::new(store, Arc::clone(&blocklist), PathCacheConfig::default());
    let config = SearchConfig::default()
        .with_blocklist(blocklist)
        .with_cache(Arc::new(cache));
    PathFinder::with_config(fetcher, config)
}

// ========== Section 1: Trivial and Scenario Searches ==========

#[tokio::test(start_paused = true)]
async fn test_same_title_is_distance_zero() {
    let finder = PathFinder::new(Arc::new(MockLinkFetcher::new()));

    for profile in [
        SearchProfile::Quick,
        SearchProfile::Full,
        SearchProfile::Extended,
    ] {
        let outcome = finder.search("Cat", "Cat", profile).await.unwrap();
        assert_eq!(
            outcome,
            SearchOutcome::Possible {
                distance: 0,
                path: path(&["Cat"]),
            }
        );
    }
}

#[tokio::test(start_paused = true)]
async fn test_same_title_after_canonicalization_is_distance_zero() {
    let fetcher = Arc::new(MockLinkFetcher::new());
    let finder = PathFinder::new(Arc::clone(&fetcher));

    let outcome = finder
        .search_with_limits("house_cat", "/wiki/House_cat#Diet", &limits(0))
        .await
        .unwrap();

    assert_eq!(outcome.path(), Some(&path(&["House cat"])[..]));
    assert_eq!(fetcher.fetch_count(), 0, "no fetch needed for a trivial search");
}

#[tokio::test(start_paused = true)]
async fn test_two_hop_chain_is_found_within_depth_two() {
    let fetcher = Arc::new(MockLinkFetcher::with_edges(&[("A", "B"), ("B", "C")]).await);
    let finder = PathFinder::new(fetcher);

    let outcome = finder.search_with_limits("A", "C", &limits(2)).await.unwrap();

    assert_eq!(
        outcome,
        SearchOutcome::Possible {
            distance: 2,
            path: path(&["A", "B", "C"]),
        }
    );
}

#[tokio::test(start_paused = true)]
async fn test_two_hop_chain_is_not_possible_within_depth_one() {
    let fetcher = Arc::new(MockLinkFetcher::with_edges(&[("A", "B"), ("B", "C")]).await);
    let finder = PathFinder::new(fetcher);

    let outcome = finder.search_with_limits("A", "C", &limits(1)).await.unwrap();

    assert_eq!(
        outcome,
        SearchOutcome::NotPossible {
            reason: "no path within 1 hops".to_string(),
        }
    );
}

#[tokio::test(start_paused = true)]
async fn test_direct_link_is_distance_one() {
    let fetcher = Arc::new(MockLinkFetcher::with_edges(&[("A", "C")]).await);
    let finder = PathFinder::new(fetcher);

    let outcome = finder.search_with_limits("A", "C", &limits(1)).await.unwrap();

    assert_eq!(outcome.distance(), Some(1));
}

#[tokio::test(start_paused = true)]
async fn test_raw_endpoints_are_canonicalized() {
    let fetcher = Arc::new(
        MockLinkFetcher::with_edges(&[("House cat", "Mammal"), ("Mammal", "Biology")]).await,
    );
    let finder = PathFinder::new(fetcher);

    let outcome = finder
        .search_with_limits("https://en.wikipedia.org/wiki/House_cat", "biology", &limits(3))
        .await
        .unwrap();

    assert_eq!(outcome.path(), Some(&path(&["House cat", "Mammal", "Biology"])[..]));
}

#[tokio::test(start_paused = true)]
async fn test_raw_link_targets_are_canonicalized() {
    let fetcher = MockLinkFetcher::new();
    fetcher.add_links("A", &["/wiki/Some_page#History"]).await;
    fetcher.add_links("Some page", &["b"]).await;
    let finder = PathFinder::new(Arc::new(fetcher));

    let outcome = finder.search_with_limits("A", "B", &limits(3)).await.unwrap();

    assert_eq!(outcome.path(), Some(&path(&["A", "Some page", "B"])[..]));
}

#[tokio::test(start_paused = true)]
async fn test_empty_endpoint_is_rejected() {
    let finder = PathFinder::new(Arc::new(MockLinkFetcher::new()));

    let result = finder.search("#References", "Cat", SearchProfile::Quick).await;

    assert!(matches!(result, Err(DomainError::InvalidTitle { .. })));
}

/// Fetcher whose titles are case-insensitive and stored lower-case.
struct LowercaseTitles(MockLinkFetcher);

#[async_trait]
impl LinkFetcher for LowercaseTitles {
    async fn outgoing_links(&self, title: &str) -> DomainResult<Vec<String>> {
        self.0.outgoing_links(title).await
    }

    fn canonicalize(&self, raw: &str) -> String {
        raw.trim().to_lowercase()
    }
}

#[tokio::test(start_paused = true)]
async fn test_remaining_distance_follows_fetcher_canonicalization() {
    let fetcher = undirected(&[("cat", "mammal"), ("mammal", "dog")]).await;
    let finder = PathFinder::new(Arc::new(LowercaseTitles(fetcher)));

    let outcome = finder.search("CAT", "Dog", SearchProfile::Quick).await.unwrap();
    let route = outcome.path().unwrap().to_vec();

    assert_eq!(route, path(&["cat", "mammal", "dog"]));
    assert_eq!(finder.remaining_distance(&route, "MAMMAL"), Some(1));
    assert_eq!(finder.remaining_distance(&route, " Cat "), Some(2));
    assert_eq!(finder.remaining_distance(&route, "bird"), None);
    // The free function only knows the default rules.
    assert_eq!(remaining_distance(&route, "MAMMAL"), None);
}

// ========== Section 2: Path Invariants ==========

#[tokio::test(start_paused = true)]
async fn test_shortest_path_satisfies_invariants() {
    let fetcher = Arc::new(diamond_graph().await);
    let finder = PathFinder::new(Arc::clone(&fetcher));

    let outcome = finder.search_with_limits("A", "F", &limits(6)).await.unwrap();

    assert_eq!(outcome.distance(), Some(3));
    assert_eq!(outcome.path(), Some(&path(&["A", "C", "G", "F"])[..]));
    assert_valid_path(&outcome, "A", "F", &fetcher).await;
}

#[tokio::test(start_paused = true)]
async fn test_tie_expands_forward_first() {
    let fetcher = Arc::new(diamond_graph().await);
    let finder = PathFinder::new(Arc::clone(&fetcher));

    finder.search_with_limits("A", "F", &limits(6)).await.unwrap();

    assert_eq!(fetcher.fetched_titles().first().map(String::as_str), Some("A"));
}

#[tokio::test(start_paused = true)]
async fn test_backward_search_uses_outgoing_links_of_target() {
    // No title links *to* C; C only links out to B2.
    let fetcher = MockLinkFetcher::new();
    fetcher.add_links("A", &["B1", "B2", "B3"]).await;
    fetcher.add_links("C", &["B2"]).await;
    let fetcher = Arc::new(fetcher);
    let finder = PathFinder::new(Arc::clone(&fetcher));

    let outcome = finder.search_with_limits("A", "C", &limits(4)).await.unwrap();

    assert_eq!(outcome.path(), Some(&path(&["A", "B2", "C"])[..]));
    assert_eq!(fetcher.fetched_titles(), path(&["A", "C"]));
}

#[tokio::test(start_paused = true)]
async fn test_blocked_titles_are_never_intermediate() {
    let fetcher = Arc::new(
        undirected(&[
            ("A", "Wayback Machine"),
            ("Wayback Machine", "C"),
            ("A", "X"),
            ("X", "Y"),
            ("Y", "C"),
        ])
        .await,
    );
    let finder = PathFinder::new(Arc::clone(&fetcher));

    let outcome = finder.search_with_limits("A", "C", &limits(6)).await.unwrap();

    assert_eq!(outcome.path(), Some(&path(&["A", "X", "Y", "C"])[..]));
    assert_valid_path(&outcome, "A", "C", &fetcher).await;
}

#[tokio::test(start_paused = true)]
async fn test_only_route_through_blocked_title_is_not_possible() {
    let fetcher = Arc::new(
        undirected(&[("A", "ISBN (identifier)"), ("ISBN (identifier)", "C")]).await,
    );
    let finder = PathFinder::new(fetcher);

    let outcome = finder.search_with_limits("A", "C", &limits(6)).await.unwrap();

    assert!(outcome.is_not_possible(), "got {outcome:?}");
}

#[tokio::test(start_paused = true)]
async fn test_blocked_title_is_allowed_as_endpoint() {
    let fetcher = Arc::new(MockLinkFetcher::with_edges(&[("A", "B"), ("B", "Wayback Machine")]).await);
    let finder = PathFinder::new(fetcher);

    let outcome = finder
        .search_with_limits("A", "Wayback Machine", &limits(3))
        .await
        .unwrap();

    assert_eq!(outcome.path(), Some(&path(&["A", "B", "Wayback Machine"])[..]));
}

#[tokio::test(start_paused = true)]
async fn test_custom_blocklist_is_honoured() {
    let fetcher = Arc::new(undirected(&[("A", "Hub"), ("Hub", "C"), ("A", "X"), ("X", "Y"), ("Y", "C")]).await);
    let config = SearchConfig::default()
        .with_blocklist(Arc::new(Blocklist::new().with_titles(["hub"])));
    let finder = PathFinder::with_config(fetcher, config);

    let outcome = finder.search_with_limits("A", "C", &limits(6)).await.unwrap();

    assert_eq!(outcome.distance(), Some(3));
}

#[tokio::test(start_paused = true)]
async fn test_disconnected_titles_are_not_possible() {
    let fetcher = Arc::new(undirected(&[("A", "B"), ("B", "C"), ("X", "Y"), ("Y", "Z")]).await);
    let finder = PathFinder::new(fetcher);

    let outcome = finder.search_with_limits("A", "Z", &limits(6)).await.unwrap();

    assert!(outcome.is_not_possible(), "got {outcome:?}");
}

// ========== Section 3: Budgets and Failures ==========

#[tokio::test(start_paused = true)]
async fn test_node_budget_of_one_is_unknown_even_when_path_exists() {
    let fetcher = Arc::new(MockLinkFetcher::with_edges(&[("A", "B"), ("B", "C")]).await);
    let finder = PathFinder::new(fetcher);

    let outcome = finder
        .search_with_limits("A", "C", &limits(5).with_max_nodes(1))
        .await
        .unwrap();

    match outcome {
        SearchOutcome::Unknown { reason } => assert!(reason.contains("node budget"), "{reason}"),
        other => panic!("expected Unknown, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_failing_fetch_terminates_without_error() {
    let fetcher = MockLinkFetcher::with_edges(&[("A", "B"), ("B", "C")]).await;
    fetcher.fail_on("B").await;
    let finder = PathFinder::new(Arc::new(fetcher));

    for profile in [
        SearchProfile::Quick,
        SearchProfile::Full,
        SearchProfile::Extended,
    ] {
        let outcome = finder.search("A", "C", profile).await.unwrap();
        assert!(
            outcome.is_not_possible() || outcome.is_unknown(),
            "got {outcome:?}"
        );
    }
}

#[tokio::test(start_paused = true)]
async fn test_failing_fetch_on_one_branch_keeps_other_branches() {
    let fetcher = undirected(&[("A", "B"), ("B", "C"), ("A", "X"), ("X", "Y"), ("Y", "C")]).await;
    fetcher.fail_on("B").await;
    let finder = PathFinder::new(Arc::new(fetcher));

    let outcome = finder.search_with_limits("A", "C", &limits(6)).await.unwrap();

    assert!(outcome.is_possible(), "got {outcome:?}");
}

#[tokio::test(start_paused = true)]
async fn test_deadline_yields_unknown() {
    let fetcher = undirected(&[("A", "B"), ("B", "C"), ("C", "D"), ("D", "E")]).await;
    let fetcher = Arc::new(fetcher.with_latency(Duration::from_millis(600)));
    let finder = PathFinder::new(fetcher);

    let outcome = finder.search("A", "E", SearchProfile::Quick).await.unwrap();

    match outcome {
        SearchOutcome::Unknown { reason } => {
            assert_eq!(reason, "time budget of 1500ms exceeded")
        }
        other => panic!("expected Unknown, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_slow_hub_cannot_stall_the_deadline() {
    let fetcher = Arc::new(
        MockLinkFetcher::with_edges(&[("A", "B")])
            .await
            .with_latency(Duration::from_secs(3_600)),
    );
    let finder = PathFinder::new(fetcher);

    let started = tokio::time::Instant::now();
    let outcome = finder
        .search_with_limits("A", "B", &limits(3).with_max_time(Duration::from_millis(200)))
        .await
        .unwrap();

    assert!(outcome.is_unknown(), "got {outcome:?}");
    assert!(started.elapsed() < Duration::from_secs(1));
}

// ========== Section 4: Monotonicity ==========

#[tokio::test(start_paused = true)]
async fn test_raising_depth_never_loses_a_path() {
    let fetcher = Arc::new(diamond_graph().await);
    let finder = PathFinder::new(fetcher);

    let mut found_at = None;
    for depth in 0..=7 {
        let outcome = finder.search_with_limits("A", "F", &limits(depth)).await.unwrap();
        if found_at.is_some() {
            assert_eq!(outcome.distance(), Some(3), "depth {depth}: {outcome:?}");
        } else if outcome.is_possible() {
            found_at = Some(depth);
        } else {
            assert!(outcome.is_not_possible(), "depth {depth}: {outcome:?}");
        }
    }
    assert_eq!(found_at, Some(3));
}

#[tokio::test(start_paused = true)]
async fn test_raising_node_budget_is_monotonic() {
    let connected = Arc::new(diamond_graph().await);
    let disconnected =
        Arc::new(undirected(&[("A", "B"), ("B", "C"), ("X", "Y"), ("Y", "Z")]).await);

    for (fetcher, target) in [(connected, "F"), (disconnected, "Z")] {
        let finder = PathFinder::new(fetcher);
        let mut previous: Option<SearchOutcome> = None;

        for max_nodes in 0..=12 {
            let outcome = finder
                .search_with_limits("A", target, &limits(6).with_max_nodes(max_nodes))
                .await
                .unwrap();

            if let Some(prev) = &previous {
                if prev.is_possible() {
                    assert_eq!(prev, &outcome, "max_nodes {max_nodes}");
                }
                if prev.is_not_possible() {
                    assert!(outcome.is_not_possible(), "max_nodes {max_nodes}: {outcome:?}");
                }
            }
            previous = Some(outcome);
        }

        assert!(
            !previous.unwrap().is_unknown(),
            "a generous node budget must settle the search"
        );
    }
}

#[tokio::test(start_paused = true)]
async fn test_raising_time_budget_is_monotonic() {
    let fetcher = Arc::new(
        diamond_graph()
            .await
            .with_latency(Duration::from_millis(100)),
    );
    let finder = PathFinder::new(fetcher);
    let mut previous: Option<SearchOutcome> = None;

    for millis in [50, 150, 250, 450, 650, 1_000, 5_000] {
        let outcome = finder
            .search_with_limits(
                "A",
                "F",
                &limits(6).with_max_time(Duration::from_millis(millis)),
            )
            .await
            .unwrap();

        if let Some(prev) = &previous {
            if prev.is_possible() {
                assert_eq!(prev, &outcome, "{millis}ms");
            }
        }
        previous = Some(outcome);
    }

    assert_eq!(previous.and_then(|o| o.distance()), Some(3));
}

// ========== Section 5: Profiles and Cache ==========

#[tokio::test(start_paused = true)]
async fn test_full_profile_result_is_cached() {
    let fetcher = Arc::new(diamond_graph().await);
    let store = Arc::new(MockCacheStore::new());
    let finder = cached_finder(Arc::clone(&fetcher), Arc::clone(&store));

    let outcome = finder.search("A", "F", SearchProfile::Full).await.unwrap();
    let cache = finder.config().cache.as_ref().unwrap();
    let entry = cache.get("A", "F").await.unwrap().unwrap();

    assert_eq!(entry.distance, outcome.distance());
    assert_valid_path(&entry.clone().into_outcome(), "A", "F", &fetcher).await;
    assert_eq!(store.put_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_cached_result_is_served_without_fetching() {
    let fetcher = Arc::new(diamond_graph().await);
    let store = Arc::new(MockCacheStore::new());
    let finder = cached_finder(Arc::clone(&fetcher), Arc::clone(&store));

    let first = finder.search("A", "F", SearchProfile::Full).await.unwrap();
    let fetches = fetcher.fetch_count();
    let second = finder.search("A", "F", SearchProfile::Quick).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(fetcher.fetch_count(), fetches);
    let stats = finder.cache_stats();
    assert_eq!((stats.hits, stats.misses, stats.skips), (1, 1, 0));
    assert!((stats.hit_ratio() - 0.5).abs() < f64::EPSILON);
}

#[tokio::test(start_paused = true)]
async fn test_quick_profile_never_writes() {
    let fetcher = Arc::new(diamond_graph().await);
    let store = Arc::new(MockCacheStore::new());
    let finder = cached_finder(fetcher, Arc::clone(&store));

    let outcome = finder.search("A", "F", SearchProfile::Quick).await.unwrap();

    assert!(outcome.is_possible());
    assert_eq!(store.put_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_quick_profile_cannot_degrade_cached_full_result() {
    let store = Arc::new(MockCacheStore::new());

    let full = cached_finder(Arc::new(diamond_graph().await), Arc::clone(&store));
    let proven = full.search("A", "F", SearchProfile::Full).await.unwrap();
    let key = full.config().cache.as_ref().unwrap().key("A", "F");
    let raw_before = store.raw(&key).await;

    // The quick run sees a graph where nothing is reachable.
    let quick = cached_finder(Arc::new(MockLinkFetcher::new()), Arc::clone(&store));
    let served = quick.search("A", "F", SearchProfile::Quick).await.unwrap();

    assert_eq!(served, proven);
    assert_eq!(store.raw(&key).await, raw_before);
    assert_eq!(store.put_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_unknown_results_are_never_cached() {
    let fetcher = Arc::new(diamond_graph().await);
    let store = Arc::new(MockCacheStore::new());
    let blocklist = Arc::new(Blocklist::new());
    let cache = PathCache::new(
        Arc::clone(&store) as Arc<dyn crate::cache::CacheStore>,
        Arc::clone(&blocklist),
        PathCacheConfig::default(),
    );
    let config = SearchConfig::default()
        .with_blocklist(blocklist)
        .with_cache(Arc::new(cache))
        .with_profile_limits(SearchProfile::Full, limits(7).with_max_nodes(1));
    let finder = PathFinder::with_config(fetcher, config);

    let outcome = finder.search("A", "F", SearchProfile::Full).await.unwrap();

    assert!(outcome.is_unknown());
    assert_eq!(store.put_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_search_that_skipped_a_failed_fetch_is_not_cached() {
    let fetcher = Arc::new(MockLinkFetcher::with_edges(&[("A", "B"), ("B", "C")]).await);
    fetcher.fail_on("B").await;
    let store = Arc::new(MockCacheStore::new());
    let finder = cached_finder(Arc::clone(&fetcher), Arc::clone(&store));

    let while_failing = finder.search("A", "C", SearchProfile::Full).await.unwrap();
    assert!(while_failing.is_not_possible(), "got {while_failing:?}");
    assert_eq!(store.put_count(), 0);

    fetcher.recover("B").await;
    let recovered = finder.search("A", "C", SearchProfile::Full).await.unwrap();

    assert_eq!(
        recovered,
        SearchOutcome::Possible {
            distance: 2,
            path: path(&["A", "B", "C"]),
        }
    );
    assert_eq!(store.put_count(), 1);
    assert_eq!(finder.cache_stats().hits, 0);
}

#[tokio::test(start_paused = true)]
async fn test_path_found_around_a_failed_fetch_is_not_cached() {
    // C's dead-end neighbors make the forward frontier [B, X] the smaller
    // one in round three, so the failing B is fetched before X meets Y.
    let fetcher = Arc::new(
        undirected(&[("A", "B"), ("A", "X"), ("X", "Y"), ("Y", "C"), ("C", "P"), ("C", "Q")])
            .await,
    );
    fetcher.fail_on("B").await;
    let store = Arc::new(MockCacheStore::new());
    let finder = cached_finder(Arc::clone(&fetcher), Arc::clone(&store));

    let outcome = finder.search("A", "C", SearchProfile::Extended).await.unwrap();

    assert_eq!(
        outcome,
        SearchOutcome::Possible {
            distance: 3,
            path: path(&["A", "X", "Y", "C"]),
        }
    );
    assert!(fetcher.fetched_titles().contains(&"B".to_string()));
    assert_eq!(store.put_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_not_possible_is_not_served_to_deeper_profiles() {
    // A chain of 8 hops: out of reach for full (7), within reach for extended (8).
    let titles = ["T0", "T1", "T2", "T3", "T4", "T5", "T6", "T7", "T8"];
    let edges: Vec<(&str, &str)> = titles.windows(2).map(|w| (w[0], w[1])).collect();
    let fetcher = Arc::new(undirected(&edges).await);
    let store = Arc::new(MockCacheStore::new());
    let finder = cached_finder(Arc::clone(&fetcher), Arc::clone(&store));

    let full = finder.search("T0", "T8", SearchProfile::Full).await.unwrap();
    let quick = finder.search("T0", "T8", SearchProfile::Quick).await.unwrap();
    let extended = finder.search("T0", "T8", SearchProfile::Extended).await.unwrap();

    assert!(full.is_not_possible(), "got {full:?}");
    assert!(quick.is_not_possible(), "quick is answered by the full entry");
    assert_eq!(extended.distance(), Some(8));

    let entry = finder
        .config()
        .cache
        .as_ref()
        .unwrap()
        .get("T0", "T8")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        entry,
        CachedEntry::from_outcome(&extended, 8).unwrap(),
        "extended result replaces the shallower proof"
    );
}

#[tokio::test(start_paused = true)]
async fn test_unavailable_cache_degrades_to_search() {
    let fetcher = Arc::new(diamond_graph().await);
    let store = Arc::new(MockCacheStore::new());
    store.set_unavailable(true);
    let finder = cached_finder(fetcher, Arc::clone(&store));

    let outcome = finder.search("A", "F", SearchProfile::Full).await.unwrap();

    assert_eq!(outcome.distance(), Some(3));
    assert_eq!(finder.cache_stats().skips, 1);
}

#[tokio::test(start_paused = true)]
async fn test_stalled_cache_is_skipped() {
    let fetcher = Arc::new(diamond_graph().await);
    let store = Arc::new(MockCacheStore::new().with_stall(Duration::from_secs(30)));
    let finder = cached_finder(fetcher, Arc::clone(&store));

    let started = tokio::time::Instant::now();
    let outcome = finder.search("A", "F", SearchProfile::Full).await.unwrap();

    assert_eq!(outcome.distance(), Some(3));
    assert_eq!(finder.cache_stats().skips, 1);
    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(store.put_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_searches_share_one_finder() {
    let fetcher = Arc::new(diamond_graph().await);
    let store = Arc::new(MockCacheStore::new());
    let finder = Arc::new(cached_finder(fetcher, store));

    let pairs = [("A", "F"), ("F", "A"), ("B", "G"), ("D", "D")];
    let outcomes = futures::future::join_all(pairs.iter().map(|(start, target)| {
        let finder = Arc::clone(&finder);
        async move { finder.search(start, target, SearchProfile::Full).await }
    }))
    .await;

    let distances: Vec<Option<usize>> = outcomes
        .into_iter()
        .map(|o| o.unwrap().distance())
        .collect();
    assert_eq!(distances, vec![Some(3), Some(3), Some(3), Some(0)]);
}
