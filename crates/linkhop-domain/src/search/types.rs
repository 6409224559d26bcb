//! Types for the path finder.

use serde::{Deserialize, Serialize};

/// Result of a bounded search.
///
/// `NotPossible` and `Unknown` are deliberately distinct: the first is a
/// proof that no path exists within the depth limit, the second only says
/// the budget ran out first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SearchOutcome {
    /// A shortest path within the depth limit. `distance == path.len() - 1`.
    Possible { distance: usize, path: Vec<String> },
    /// The search space within the depth limit was exhausted without a meeting.
    NotPossible { reason: String },
    /// A time or node ceiling was hit before the question was settled.
    Unknown { reason: String },
}

impl SearchOutcome {
    /// Builds a `Possible` outcome from a path.
    pub(crate) fn found(path: Vec<String>) -> Self {
        SearchOutcome::Possible {
            distance: path.len().saturating_sub(1),
            path,
        }
    }

    pub fn is_possible(&self) -> bool {
        matches!(self, SearchOutcome::Possible { .. })
    }

    pub fn is_not_possible(&self) -> bool {
        matches!(self, SearchOutcome::NotPossible { .. })
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, SearchOutcome::Unknown { .. })
    }

    /// Path length in hops, if a path was found.
    pub fn distance(&self) -> Option<usize> {
        match self {
            SearchOutcome::Possible { distance, .. } => Some(*distance),
            _ => None,
        }
    }

    /// The path, if one was found.
    pub fn path(&self) -> Option<&[String]> {
        match self {
            SearchOutcome::Possible { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Stable label used in logs and metrics.
    pub fn status(&self) -> &'static str {
        match self {
            SearchOutcome::Possible { .. } => "possible",
            SearchOutcome::NotPossible { .. } => "not_possible",
            SearchOutcome::Unknown { .. } => "unknown",
        }
    }
}
