//! Path reconstruction and path-relative distance lookups.

use crate::title::canonicalize;

use super::expand::VisitedMap;

/// Joins the two search trees at `meeting` into one start-to-target path.
///
/// The forward tree is walked from the meeting node to its root and
/// reversed; the backward tree is walked from the meeting node's backward
/// parent to its root, which is already meeting-to-target order. The two
/// trees only share the meeting node, so no title repeats.
pub fn reconstruct_path(
    meeting: &str,
    forward_visited: &VisitedMap,
    backward_visited: &VisitedMap,
) -> Vec<String> {
    let mut path = vec![meeting.to_string()];

    let mut cursor = parent_of(forward_visited, meeting);
    while let Some(node) = cursor {
        path.push(node.to_string());
        cursor = parent_of(forward_visited, node);
    }
    path.reverse();

    let mut cursor = parent_of(backward_visited, meeting);
    while let Some(node) = cursor {
        path.push(node.to_string());
        cursor = parent_of(backward_visited, node);
    }

    path
}

fn parent_of<'a>(visited: &'a VisitedMap, node: &str) -> Option<&'a str> {
    visited.get(node).and_then(|parent| parent.as_deref())
}

/// Hops left from `title` to the end of a previously found `path`.
///
/// Lets a caller update a distance in O(path length) while a player stays
/// on an already discovered route. Returns `None` when the title is not on
/// the path; the distance is then unknown and needs a real search.
///
/// Matches under the default [`canonicalize`] rules. A finder whose fetcher
/// canonicalizes differently answers through
/// [`PathFinder::remaining_distance`](super::PathFinder::remaining_distance).
pub fn remaining_distance(path: &[String], title: &str) -> Option<usize> {
    distance_to_end(path, &canonicalize(title))
}

/// Index distance from an already canonical `title` to the end of `path`.
pub(crate) fn distance_to_end(path: &[String], title: &str) -> Option<usize> {
    path.iter()
        .position(|node| node == title)
        .map(|index| path.len() - 1 - index)
}
