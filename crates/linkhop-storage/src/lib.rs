//! linkhop-storage: In-memory backends for linkhop
//!
//! This crate provides the backends the search engine is plugged into when
//! no remote wiki or shared cache is involved:
//! - `MemoryLinkGraph`, a `LinkFetcher` over an in-memory adjacency
//! - `MemoryCacheStore`, a `CacheStore` over a Moka cache
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              linkhop-storage                │
//! ├─────────────────────────────────────────────┤
//! │  graph.rs - In-memory link graph            │
//! │  cache.rs - In-process TTL cache store      │
//! │  error.rs - Storage errors                  │
//! └─────────────────────────────────────────────┘
//! ```

pub mod cache;
pub mod error;
pub mod graph;

// Re-export commonly used types
pub use cache::MemoryCacheStore;
pub use error::{StorageError, StorageResult};
pub use graph::MemoryLinkGraph;
