//! Traits for link fetching needed by the path finder.

use async_trait::async_trait;

use crate::error::DomainResult;
use crate::title;

/// Source of outgoing links for a title.
///
/// The backward half of the bidirectional search expands target-side
/// titles through this same outgoing-link call; no incoming-link source is
/// consulted. Paths found through the backward half therefore assume links
/// are navigable in both directions.
#[async_trait]
pub trait LinkFetcher: Send + Sync {
    /// Returns the raw link targets found on `title`, in source order.
    ///
    /// Failures are per title: the search logs them and skips the title.
    async fn outgoing_links(&self, title: &str) -> DomainResult<Vec<String>>;

    /// Maps a raw link target or user input to its canonical title.
    ///
    /// Must be idempotent. Defaults to [`title::canonicalize`].
    fn canonicalize(&self, raw: &str) -> String {
        title::canonicalize(raw)
    }
}
