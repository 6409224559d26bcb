//! Domain error types for link-graph search.

use thiserror::Error;

/// Domain-specific errors for link-graph search.
///
/// Most of these never escape a search: fetch failures and cache failures
/// are absorbed where they happen and only degrade the search. Budget
/// exhaustion and proven unreachability are outcomes, not errors (see
/// [`crate::search::SearchOutcome`]).
#[derive(Debug, Error)]
pub enum DomainError {
    /// The outgoing links of a title could not be fetched.
    #[error("failed to fetch links for '{title}': {message}")]
    FetchFailed { title: String, message: String },

    /// The cache store could not be reached or did not answer in time.
    #[error("cache unavailable: {message}")]
    CacheUnavailable { message: String },

    /// A caller-supplied title is empty after canonicalization.
    #[error("invalid title: {value:?}")]
    InvalidTitle { value: String },

    /// A cache entry could not be encoded or decoded.
    #[error("serialization error: {message}")]
    Serialization { message: String },
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::Serialization {
            message: err.to_string(),
        }
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
