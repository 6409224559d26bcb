//! linkhop-server: Configuration and the search service
//!
//! This crate wires the search engine into something a caller can run:
//! - Configuration loading (defaults, YAML, `LINKHOP_` environment)
//! - Structured logging setup
//! - `SearchService`, a deduplicating front for the path finder
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               linkhop-server                │
//! ├─────────────────────────────────────────────┤
//! │  config.rs  - Configuration management      │
//! │  logging.rs - tracing-subscriber setup      │
//! │  service/   - Search service                │
//! │    handler.rs     - SearchService           │
//! │    singleflight.rs - Concurrent dedup       │
//! │    types.rs       - Requests and results    │
//! │  main.rs    - `linkhop` command line        │
//! └─────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod logging;
pub mod service;

// Re-exports for convenience
pub use config::{ConfigLoadError, LinkhopConfig};
pub use logging::init_logging;
pub use service::{
    BatchSearchError, BatchSearchItemResult, SearchRequest, SearchService, MAX_BATCH_SIZE,
};

/// Registers descriptions for every metric linkhop emits.
pub fn register_metrics() {
    linkhop_domain::cache::register_path_cache_metrics();
    linkhop_domain::search::register_search_metrics();
    service::register_service_metrics();
}
