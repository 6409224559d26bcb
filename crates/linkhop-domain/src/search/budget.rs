//! Per-invocation time and node budget.

use std::fmt;
use std::time::Duration;

use tokio::time::Instant;

use super::config::SearchLimits;

/// Which ceiling a search ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetExceeded {
    /// The wall-clock deadline passed.
    Time { limit: Duration },
    /// The visited-node ceiling was reached.
    Nodes { limit: usize },
}

impl fmt::Display for BudgetExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BudgetExceeded::Time { limit } => {
                write!(f, "time budget of {}ms exceeded", limit.as_millis())
            }
            BudgetExceeded::Nodes { limit } => {
                write!(f, "node budget of {limit} titles exceeded")
            }
        }
    }
}

/// Deadline plus visited-node counter for one search invocation.
///
/// Also counts titles whose link fetch failed and was skipped. A search
/// that skipped titles has not looked at the whole graph within its depth.
///
/// Built on `tokio::time::Instant`, so tests can drive the deadline with
/// tokio's paused clock.
#[derive(Debug, Clone)]
pub struct Budget {
    started: Instant,
    max_time: Duration,
    max_nodes: usize,
    visited: usize,
    skipped_fetches: usize,
}

impl Budget {
    /// Starts a budget now.
    pub fn start(limits: &SearchLimits) -> Self {
        Self {
            started: Instant::now(),
            max_time: limits.max_time,
            max_nodes: limits.max_nodes,
            visited: 0,
            skipped_fetches: 0,
        }
    }

    /// Fails if either ceiling has been reached.
    pub fn check(&self) -> Result<(), BudgetExceeded> {
        if self.visited >= self.max_nodes {
            return Err(self.nodes_exceeded());
        }
        if self.started.elapsed() >= self.max_time {
            return Err(self.time_exceeded());
        }
        Ok(())
    }

    /// Counts one newly discovered title; fails once the node ceiling is reached.
    pub fn record_visit(&mut self) -> Result<(), BudgetExceeded> {
        self.visited += 1;
        if self.visited >= self.max_nodes {
            return Err(self.nodes_exceeded());
        }
        Ok(())
    }

    /// Counts one title dropped after its link fetch failed.
    pub fn record_skipped_fetch(&mut self) {
        self.skipped_fetches += 1;
    }

    /// Titles dropped after a failed link fetch.
    pub fn skipped_fetches(&self) -> usize {
        self.skipped_fetches
    }

    /// Time left before the deadline.
    pub fn remaining_time(&self) -> Duration {
        self.max_time.saturating_sub(self.started.elapsed())
    }

    pub fn time_exceeded(&self) -> BudgetExceeded {
        BudgetExceeded::Time {
            limit: self.max_time,
        }
    }

    fn nodes_exceeded(&self) -> BudgetExceeded {
        BudgetExceeded::Nodes {
            limit: self.max_nodes,
        }
    }

    /// Titles discovered so far.
    pub fn visited(&self) -> usize {
        self.visited
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}
