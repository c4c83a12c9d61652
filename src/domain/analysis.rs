//! Cached analysis snapshot
//!
//! [`AnalysisCache`] holds the result of the last explicit
//! [`recompute`](AnalysisCache::recompute). Mutating the graph does not
//! refresh it: callers batch their edits and recompute when they want the
//! snapshot to reflect them. Until then reads observe the previous
//! snapshot, which [`is_stale`](AnalysisCache::is_stale) reports.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::chains::{longest_chains_with_limit, DEFAULT_MAX_CHAINS};
use super::graph::DependencyGraph;
use super::name::TaskName;
use super::order::{maximal, minimal, notation, topological_order, EMPTY_SET};

/// Immutable result of analysing a graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub minimal: Vec<TaskName>,
    pub maximal: Vec<TaskName>,
    pub topological_order: Vec<TaskName>,
    pub chains: Vec<Vec<TaskName>>,
    pub notation: String,

    /// Graph revision this result was computed from
    #[serde(default)]
    pub revision: Option<u64>,

    #[serde(default)]
    pub task_count: usize,

    #[serde(default)]
    pub relation_count: usize,
}

impl Default for AnalysisResult {
    fn default() -> Self {
        Self {
            minimal: vec![],
            maximal: vec![],
            topological_order: vec![],
            chains: vec![],
            notation: EMPTY_SET.to_string(),
            revision: None,
            task_count: 0,
            relation_count: 0,
        }
    }
}

impl AnalysisResult {
    /// Runs every analysis over the graph
    pub fn compute(graph: &DependencyGraph, max_chains: usize) -> Self {
        Self {
            minimal: minimal(graph),
            maximal: maximal(graph),
            topological_order: topological_order(graph),
            chains: longest_chains_with_limit(graph, max_chains),
            notation: notation(graph),
            revision: Some(graph.revision()),
            task_count: graph.len(),
            relation_count: graph.relations().len(),
        }
    }

    /// Returns true if any chain has exactly `size` tasks
    pub fn has_chain_of_size(&self, size: usize) -> bool {
        self.chains.iter().any(|chain| chain.len() == size)
    }
}

/// Holds the last computed [`AnalysisResult`]
#[derive(Debug, Clone)]
pub struct AnalysisCache {
    result: AnalysisResult,
    max_chains: usize,
}

impl Default for AnalysisCache {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisCache {
    /// Creates a cache holding an empty result
    pub fn new() -> Self {
        Self::with_max_chains(DEFAULT_MAX_CHAINS)
    }

    /// Creates a cache that keeps at most `max_chains` chains
    pub fn with_max_chains(max_chains: usize) -> Self {
        Self {
            result: AnalysisResult::default(),
            max_chains,
        }
    }

    /// Wraps a previously computed result
    pub fn from_result(result: AnalysisResult, max_chains: usize) -> Self {
        Self { result, max_chains }
    }

    /// Recomputes the snapshot from the graph, replacing the old one
    pub fn recompute(&mut self, graph: &DependencyGraph) -> &AnalysisResult {
        self.result = AnalysisResult::compute(graph, self.max_chains);
        debug!(
            revision = graph.revision(),
            tasks = self.result.task_count,
            chains = self.result.chains.len(),
            "Recomputed analysis"
        );
        &self.result
    }

    /// The last computed snapshot (possibly stale)
    pub fn result(&self) -> &AnalysisResult {
        &self.result
    }

    /// Returns true if any cached chain has exactly `size` tasks
    pub fn has_chain_of_size(&self, size: usize) -> bool {
        self.result.has_chain_of_size(size)
    }

    /// Returns true if the graph changed since the last recompute
    pub fn is_stale(&self, graph: &DependencyGraph) -> bool {
        self.result.revision != Some(graph.revision())
    }

    pub fn max_chains(&self) -> usize {
        self.max_chains
    }
}
