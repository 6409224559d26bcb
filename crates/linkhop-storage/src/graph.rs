//! In-memory link graph.
//!
//! Serves outgoing links from a `DashMap` adjacency instead of a remote
//! wiki. Used by tests and offline runs, and as the reference
//! [`LinkFetcher`] implementation.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::{debug, instrument, trace};

use linkhop_domain::title::canonicalize;
use linkhop_domain::{DomainError, DomainResult, LinkFetcher};

use crate::error::{StorageError, StorageResult};

/// In-memory implementation of [`LinkFetcher`].
///
/// # Performance Characteristics
///
/// - **Fetch**: O(L) where L is the number of links of the title (clone)
/// - **Add links**: O(1) average per link
///
/// Titles used as keys are canonicalized on insert and on lookup. Link
/// targets are stored as given; the search canonicalizes them.
///
/// A title without an entry has no outgoing links. Titles marked with
/// [`fail_title`](Self::fail_title) answer every fetch with
/// [`DomainError::FetchFailed`].
#[derive(Debug, Default)]
pub struct MemoryLinkGraph {
    links: DashMap<String, Vec<String>>,
    /// Title -> failure message.
    failing: DashMap<String, String>,
    fetches: AtomicU64,
}

impl MemoryLinkGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty graph wrapped in Arc.
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Builds a graph from a title -> links map.
    pub fn from_adjacency(adjacency: HashMap<String, Vec<String>>) -> StorageResult<Self> {
        let graph = Self::new();
        for (title, targets) in adjacency {
            graph.add_links(&title, targets)?;
        }
        Ok(graph)
    }

    /// Parses a JSON object of the form `{"Title": ["Link", ...], ...}`.
    pub fn from_json_str(json: &str) -> StorageResult<Self> {
        Self::parse(json, "<inline>")
    }

    /// Loads a JSON adjacency file (same format as [`from_json_str`](Self::from_json_str)).
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub async fn load_json_file(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| StorageError::Io {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        let graph = Self::parse(&json, &path.display().to_string())?;
        debug!(
            titles = graph.title_count(),
            links = graph.link_count(),
            "loaded link graph"
        );
        Ok(graph)
    }

    fn parse(json: &str, source_name: &str) -> StorageResult<Self> {
        let adjacency: HashMap<String, Vec<String>> =
            serde_json::from_str(json).map_err(|e| StorageError::Parse {
                source_name: source_name.to_string(),
                message: e.to_string(),
            })?;
        Self::from_adjacency(adjacency)
    }

    /// Appends outgoing links to a title, creating it if needed.
    pub fn add_links<I, S>(&self, title: &str, targets: I) -> StorageResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let key = Self::key(title)?;
        self.links
            .entry(key)
            .or_default()
            .extend(targets.into_iter().map(Into::into));
        Ok(())
    }

    /// Replaces the outgoing links of a title.
    pub fn set_links<I, S>(&self, title: &str, targets: I) -> StorageResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let key = Self::key(title)?;
        self.links
            .insert(key, targets.into_iter().map(Into::into).collect());
        Ok(())
    }

    /// Removes a title and its outgoing links. Returns whether it existed.
    pub fn remove_title(&self, title: &str) -> bool {
        self.links.remove(&canonicalize(title)).is_some()
    }

    /// Makes every fetch of `title` fail with `message`.
    pub fn fail_title(&self, title: &str, message: impl Into<String>) {
        self.failing.insert(canonicalize(title), message.into());
    }

    /// Undoes [`fail_title`](Self::fail_title).
    pub fn clear_failure(&self, title: &str) {
        self.failing.remove(&canonicalize(title));
    }

    /// Number of titles with an adjacency entry.
    pub fn title_count(&self) -> usize {
        self.links.len()
    }

    /// Total number of stored links.
    pub fn link_count(&self) -> usize {
        self.links.iter().map(|entry| entry.value().len()).sum()
    }

    /// Number of fetches served (failed ones included).
    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::Relaxed)
    }

    fn key(title: &str) -> StorageResult<String> {
        let key = canonicalize(title);
        if key.is_empty() {
            return Err(StorageError::InvalidInput {
                message: format!("title {title:?} is empty after canonicalization"),
            });
        }
        Ok(key)
    }
}

#[async_trait]
impl LinkFetcher for MemoryLinkGraph {
    async fn outgoing_links(&self, title: &str) -> DomainResult<Vec<String>> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        let key = canonicalize(title);

        if let Some(message) = self.failing.get(&key) {
            return Err(DomainError::FetchFailed {
                title: key,
                message: message.value().clone(),
            });
        }

        let links = self
            .links
            .get(&key)
            .map(|entry| entry.value().clone())
            .unwrap_or_default();
        trace!(title = %key, links = links.len(), "served links from memory");
        Ok(links)
    }
}
