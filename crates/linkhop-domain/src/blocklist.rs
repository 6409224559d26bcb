//! Hub-title blocklist.
//!
//! Citation, identifier and archive pages are linked from a large share of
//! all articles. Letting the search walk through them turns almost every
//! pair of titles into a two- or three-hop path, so they are never treated
//! as neighbors.

use std::collections::HashSet;

use crate::title::canonicalize;

/// Marker carried by identifier-style citation pages such as `ISBN (identifier)`.
pub const IDENTIFIER_MARKER: &str = "(identifier)";

/// Curated hub titles blocked by default.
pub const DEFAULT_BLOCKED_TITLES: &[&str] = &[
    "Main Page",
    "Digital object identifier",
    "International Standard Book Number",
    "International Standard Serial Number",
    "PubMed",
    "PubMed Central",
    "PubMed Identifier",
    "JSTOR",
    "OCLC",
    "Bibcode",
    "ArXiv",
    "Semantic Scholar",
    "Wayback Machine",
    "Internet Archive",
    "Archive.today",
    "Wikidata",
    "Wikimedia Commons",
    "Geographic coordinate system",
    "Virtual International Authority File",
    "Library of Congress Control Number",
    "Integrated Authority File",
    "Help:Authority control",
];

/// Classifies titles that must never be traversed.
///
/// Matching is case-insensitive on the canonical title. The predicate is
/// pure: a `Blocklist` never changes after construction, so a changed
/// blocklist means a new value (and possibly stale cache entries, see
/// [`crate::cache::PathCache`]).
#[derive(Debug, Clone)]
pub struct Blocklist {
    /// Lower-cased canonical titles.
    titles: HashSet<String>,
}

impl Default for Blocklist {
    fn default() -> Self {
        Self::new()
    }
}

impl Blocklist {
    /// Creates the default blocklist.
    pub fn new() -> Self {
        Self::empty().with_titles(DEFAULT_BLOCKED_TITLES.iter().copied())
    }

    /// Creates a blocklist that only applies the identifier marker rule.
    pub fn empty() -> Self {
        Self {
            titles: HashSet::new(),
        }
    }

    /// Adds titles to the blocklist. Raw titles are canonicalized first.
    pub fn with_titles<I, S>(mut self, titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.titles.extend(
            titles
                .into_iter()
                .map(|t| canonicalize(t.as_ref()).to_lowercase())
                .filter(|t| !t.is_empty()),
        );
        self
    }

    /// Returns true if the canonical `title` must not be traversed.
    pub fn is_blocked(&self, title: &str) -> bool {
        let lowered = title.to_lowercase();
        lowered.contains(IDENTIFIER_MARKER) || self.titles.contains(&lowered)
    }

    /// Number of explicitly listed titles.
    pub fn len(&self) -> usize {
        self.titles.len()
    }

    /// Returns true if no titles are explicitly listed.
    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}
