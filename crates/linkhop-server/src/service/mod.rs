//! Search service with two-stage deduplication.
//!
//! The service is what callers hold on to. It owns a [`PathFinder`]
//! (and through it the blocklist, profiles and path cache) and adds:
//!
//! 1. **Intra-batch deduplication**: identical searches in one batch run once
//! 2. **Singleflight**: concurrent identical searches share one traversal
//!
//! Searches are identified by canonical endpoints plus profile, so
//! `house_cat` and `/wiki/House_cat` are the same search.
//!
//! [`PathFinder`]: linkhop_domain::PathFinder

mod handler;
mod singleflight;
mod types;

pub use handler::{register_service_metrics, SearchService};
pub use types::{
    BatchSearchError, BatchSearchItemResult, BatchSearchResult, SearchRequest, MAX_BATCH_SIZE,
};
