//! Bounded bidirectional search over a lazily fetched link graph.
//!
//! ```text
//! PathFinder::search(start, target, profile)
//!   ├─ PathCache::get            (optional, every profile)
//!   ├─ loop: expand smaller frontier
//!   │    └─ LinkFetcher::outgoing_links per frontier title
//!   ├─ reconstruct_path on meeting
//!   └─ PathCache::put            (optional, full/extended only)
//! ```

mod budget;
mod config;
mod engine;
mod expand;
mod path;
mod traits;
mod types;

#[cfg(test)]
pub(crate) mod tests;

pub use budget::{Budget, BudgetExceeded};
pub use config::{SearchConfig, SearchLimits, SearchProfile};
pub use engine::{register_search_metrics, PathFinder};
pub use expand::{expand, Direction, Expansion, VisitedMap};
pub use path::{reconstruct_path, remaining_distance};
pub use traits::LinkFetcher;
pub use types::SearchOutcome;
