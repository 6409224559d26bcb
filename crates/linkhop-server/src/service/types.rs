//! Data types for search service operations.

use serde::{Deserialize, Serialize};

use linkhop_domain::{SearchOutcome, SearchProfile};

/// Maximum number of searches per batch.
pub const MAX_BATCH_SIZE: usize = 50;

/// One search to run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Raw start title (canonicalized by the service).
    pub start: String,
    /// Raw target title (canonicalized by the service).
    pub target: String,
    /// Budget profile to run under.
    #[serde(default = "default_profile")]
    pub profile: SearchProfile,
}

fn default_profile() -> SearchProfile {
    SearchProfile::Quick
}

impl SearchRequest {
    pub fn new(start: impl Into<String>, target: impl Into<String>, profile: SearchProfile) -> Self {
        Self {
            start: start.into(),
            target: target.into(),
            profile,
        }
    }
}

/// Result of a single search within a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchSearchItemResult {
    /// The outcome, absent if the search failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<SearchOutcome>,
    /// Error message if the search failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Errors that reject a whole batch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BatchSearchError {
    /// The batch request is empty.
    #[error("batch request cannot be empty")]
    EmptyBatch,

    /// The batch request exceeds the maximum allowed size.
    #[error("batch size {size} exceeds maximum allowed {max}")]
    BatchTooLarge { size: usize, max: usize },

    /// A search in the batch has an unusable endpoint.
    #[error("invalid search at index {index}: {message}")]
    InvalidSearch { index: usize, message: String },
}

/// Result type for batch search operations.
pub type BatchSearchResult<T> = Result<T, BatchSearchError>;
