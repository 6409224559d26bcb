//! Tests for the search module.
//!
//! Organized by functionality:
//! - Trivial and scenario searches
//! - Path invariants and blocklist handling
//! - Budgets (node ceiling, deadline, failing fetches)
//! - Monotonicity across limits
//! - Profiles and the result cache


mod search_tests;
