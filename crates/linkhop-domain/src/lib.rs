//! linkhop-domain: Core link-graph search logic
//!
//! This crate contains the search engine and the pieces it is built from:
//! - Title canonicalization (node identity)
//! - Hub-title blocklist
//! - Bounded bidirectional search with time and node budgets
//! - Search result cache adapter
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               linkhop-domain                │
//! ├─────────────────────────────────────────────┤
//! │  title.rs     - Title canonicalization      │
//! │  blocklist.rs - Hub-title blocklist         │
//! │  search/      - Bidirectional search engine │
//! │  cache/       - Search result caching       │
//! └─────────────────────────────────────────────┘
//! ```

pub mod blocklist;
pub mod cache;
pub mod error;
pub mod search;
pub mod title;

// Re-export commonly used types at the crate root
pub use blocklist::Blocklist;
pub use cache::{
    CacheStore, CachedEntry, PathCache, PathCacheConfig, PathCacheStats, PathCacheStatsSnapshot,
};
pub use error::{DomainError, DomainResult};
pub use search::{
    remaining_distance, LinkFetcher, PathFinder, SearchConfig, SearchLimits, SearchOutcome,
    SearchProfile,
};
