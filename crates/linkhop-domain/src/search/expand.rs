//! One BFS round for one search direction.

use std::collections::HashMap;
use std::fmt;

use tokio::time::timeout;
use tracing::{trace, warn};

use crate::blocklist::Blocklist;

use super::budget::{Budget, BudgetExceeded};
use super::traits::LinkFetcher;

/// Title → parent title, `None` for the direction's root.
///
/// Once a title is present its parent never changes.
pub type VisitedMap = HashMap<String, Option<String>>;

/// Search direction, forward from the start or backward from the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => f.write_str("forward"),
            Direction::Backward => f.write_str("backward"),
        }
    }
}

/// Result of expanding one frontier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expansion {
    /// No meeting; the titles to expand next round, in discovery order.
    Frontier(Vec<String>),
    /// A discovered title already visited by the other direction.
    Meeting(String),
    /// A ceiling was hit; the partial next frontier is discarded.
    BudgetExceeded(BudgetExceeded),
}

/// Expands every title of `frontier` by one hop.
///
/// The budget is checked before each title, not once per round, because a
/// single hub title can carry thousands of links. The link fetch is bounded
/// by the time left in the budget. A fetch failure only skips its title,
/// and the skip is counted on the budget.
///
/// The first neighbor found in `other_visited` wins and is returned
/// immediately, after being recorded in `own_visited` with the current
/// title as parent.
pub async fn expand<F>(
    fetcher: &F,
    blocklist: &Blocklist,
    frontier: &[String],
    own_visited: &mut VisitedMap,
    other_visited: &VisitedMap,
    budget: &mut Budget,
) -> Expansion
where
    F: LinkFetcher + ?Sized,
{
    let mut next = Vec::new();

    for node in frontier {
        if let Err(exceeded) = budget.check() {
            return Expansion::BudgetExceeded(exceeded);
        }

        let links = match timeout(budget.remaining_time(), fetcher.outgoing_links(node)).await {
            Ok(Ok(links)) => links,
            Ok(Err(err)) => {
                warn!(title = %node, error = %err, "skipping title after link fetch failure");
                budget.record_skipped_fetch();
                continue;
            }
            Err(_) => return Expansion::BudgetExceeded(budget.time_exceeded()),
        };
        trace!(title = %node, links = links.len(), "fetched outgoing links");

        for raw in links {
            let neighbor = fetcher.canonicalize(&raw);
            if neighbor.is_empty() || neighbor == *node {
                continue;
            }
            // The other direction's root is an endpoint, never traversed through.
            if blocklist.is_blocked(&neighbor) && !is_root(other_visited, &neighbor) {
                continue;
            }

            if other_visited.contains_key(&neighbor) {
                own_visited
                    .entry(neighbor.clone())
                    .or_insert_with(|| Some(node.clone()));
                return Expansion::Meeting(neighbor);
            }

            if own_visited.contains_key(&neighbor) {
                continue;
            }
            own_visited.insert(neighbor.clone(), Some(node.clone()));
            next.push(neighbor);

            if let Err(exceeded) = budget.record_visit() {
                return Expansion::BudgetExceeded(exceeded);
            }
        }
    }

    Expansion::Frontier(next)
}

fn is_root(visited: &VisitedMap, title: &str) -> bool {
    matches!(visited.get(title), Some(None))
}
