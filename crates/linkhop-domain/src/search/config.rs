//! Configuration for the path finder.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::blocklist::Blocklist;
use crate::cache::PathCache;

/// Hard ceilings for one search invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    /// Maximum path length in hops.
    pub max_depth: u32,
    /// Maximum number of newly discovered titles across both directions.
    pub max_nodes: usize,
    /// Wall-clock ceiling for the whole traversal.
    pub max_time: Duration,
}

impl SearchLimits {
    /// Creates limits from raw values.
    pub fn new(max_depth: u32, max_nodes: usize, max_time: Duration) -> Self {
        Self {
            max_depth,
            max_nodes,
            max_time,
        }
    }

    /// Returns these limits with a different depth ceiling.
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Returns these limits with a different node ceiling.
    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    /// Returns these limits with a different time ceiling.
    pub fn with_max_time(mut self, max_time: Duration) -> Self {
        self.max_time = max_time;
        self
    }
}

/// Named budget configuration selected by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchProfile {
    /// Interactive checks: 5 hops, 5 000 titles, 1.5 s.
    Quick,
    /// Default for proving optimal distances: 7 hops, 50 000 titles, 5 s.
    Full,
    /// Background runs: 8 hops, 200 000 titles, 30 s.
    Extended,
}

impl SearchProfile {
    /// Built-in limits for this profile.
    pub fn default_limits(self) -> SearchLimits {
        match self {
            SearchProfile::Quick => SearchLimits::new(5, 5_000, Duration::from_millis(1_500)),
            SearchProfile::Full => SearchLimits::new(7, 50_000, Duration::from_millis(5_000)),
            SearchProfile::Extended => {
                SearchLimits::new(8, 200_000, Duration::from_millis(30_000))
            }
        }
    }

    /// Whether results computed under this profile may be written to the cache.
    ///
    /// Quick runs are read-only so a narrow-budget result can never replace
    /// one proven under a larger budget.
    pub fn writes_cache(self) -> bool {
        !matches!(self, SearchProfile::Quick)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SearchProfile::Quick => "quick",
            SearchProfile::Full => "full",
            SearchProfile::Extended => "extended",
        }
    }
}

impl fmt::Display for SearchProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quick" => Ok(SearchProfile::Quick),
            "full" => Ok(SearchProfile::Full),
            "extended" => Ok(SearchProfile::Extended),
            other => Err(format!("unknown search profile: {other}")),
        }
    }
}

/// Configuration for the path finder.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Limits used by [`SearchProfile::Quick`].
    pub quick: SearchLimits,
    /// Limits used by [`SearchProfile::Full`].
    pub full: SearchLimits,
    /// Limits used by [`SearchProfile::Extended`].
    pub extended: SearchLimits,
    /// Titles that are never traversed.
    pub blocklist: Arc<Blocklist>,
    /// Optional result cache.
    ///
    /// When present, every profile reads it before searching and the full
    /// and extended profiles write proven results back.
    pub cache: Option<Arc<PathCache>>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            quick: SearchProfile::Quick.default_limits(),
            full: SearchProfile::Full.default_limits(),
            extended: SearchProfile::Extended.default_limits(),
            blocklist: Arc::new(Blocklist::new()),
            cache: None,
        }
    }
}

impl SearchConfig {
    /// Enables the result cache.
    pub fn with_cache(mut self, cache: Arc<PathCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Replaces the blocklist.
    pub fn with_blocklist(mut self, blocklist: Arc<Blocklist>) -> Self {
        self.blocklist = blocklist;
        self
    }

    /// Overrides the limits of one profile.
    pub fn with_profile_limits(mut self, profile: SearchProfile, limits: SearchLimits) -> Self {
        match profile {
            SearchProfile::Quick => self.quick = limits,
            SearchProfile::Full => self.full = limits,
            SearchProfile::Extended => self.extended = limits,
        }
        self
    }

    /// Returns the limits configured for `profile`.
    pub fn limits_for(&self, profile: SearchProfile) -> SearchLimits {
        match profile {
            SearchProfile::Quick => self.quick,
            SearchProfile::Full => self.full,
            SearchProfile::Extended => self.extended,
        }
    }
}
