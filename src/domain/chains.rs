//! Longest dependency chains
//!
//! A chain is a simple directed path of at least two tasks. Starting from
//! every minimal task, paths are extended depth-first along outgoing
//! relations; a path is recorded when its last task has no successor left
//! to visit. Only maximal extensions are recorded, so a prefix of a longer
//! chain never shows up on its own.
//!
//! The result is deduplicated, stably sorted by length (longest first) and
//! capped. It summarises the critical paths; it is not every simple path.

use std::collections::HashSet;
use tracing::trace;

use super::graph::{DependencyGraph, GraphIndex};
use super::name::TaskName;

/// Default number of chains kept
pub const DEFAULT_MAX_CHAINS: usize = 5;

/// Longest chains, at most [`DEFAULT_MAX_CHAINS`]
pub fn longest_chains(graph: &DependencyGraph) -> Vec<Vec<TaskName>> {
    longest_chains_with_limit(graph, DEFAULT_MAX_CHAINS)
}

/// Longest chains, at most `limit`
pub fn longest_chains_with_limit(graph: &DependencyGraph, limit: usize) -> Vec<Vec<TaskName>> {
    let index = graph.index();
    let mut candidates = Vec::new();

    for start in 0..index.names.len() {
        if index.in_degree[start] == 0 {
            explore_from(&index, start, &mut candidates);
        }
    }

    let found = candidates.len();
    let mut seen = HashSet::new();
    candidates.retain(|chain| seen.insert(chain.clone()));

    // sort_by is stable: equal lengths keep discovery order
    candidates.sort_by(|a, b| b.len().cmp(&a.len()));
    candidates.truncate(limit);

    trace!(found, kept = candidates.len(), "Enumerated chains");

    candidates
        .into_iter()
        .map(|chain| chain.into_iter().map(|i| index.names[i].clone()).collect())
        .collect()
}

/// Depth-first walk from `start` with an explicit stack
///
/// `cursors[k]` is the next successor of `path[k]` to try.
fn explore_from(index: &GraphIndex<'_>, start: usize, out: &mut Vec<Vec<usize>>) {
    let mut on_path = vec![false; index.names.len()];
    let mut path = vec![start];
    let mut cursors = vec![0usize];
    on_path[start] = true;

    while let Some(cursor) = cursors.last_mut() {
        let Some(&node) = path.last() else { break };
        let successors = &index.successors[node];

        while *cursor < successors.len() && on_path[successors[*cursor]] {
            *cursor += 1;
        }

        match successors.get(*cursor) {
            Some(&next) => {
                *cursor += 1;
                path.push(next);
                on_path[next] = true;
                cursors.push(0);

                let terminal = index.successors[next].iter().all(|&s| on_path[s]);
                if terminal && path.len() >= 2 {
                    out.push(path.clone());
                }
            }
            None => {
                cursors.pop();
                if let Some(done) = path.pop() {
                    on_path[done] = false;
                }
            }
        }
    }
}
