//! Random graph generation
//!
//! Picks a random subset of names from a pool and makes a handful of random
//! dependency attempts. Attempts go through the normal
//! [`DependencyGraph::add_dependency`] rules, so self-loops, duplicates and
//! cycle-closing edges are simply dropped.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::graph::DependencyGraph;

/// Default pool of task names
pub const DEFAULT_NAMES: [&str; 15] = [
    "Analysis",
    "Design",
    "Development",
    "Testing",
    "Deploy",
    "Documentation",
    "Review",
    "Planning",
    "Research",
    "Implementation",
    "Validation",
    "Optimization",
    "Integration",
    "Configuration",
    "Maintenance",
];

/// Options for [`generate`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateOptions {
    /// Minimum number of tasks
    pub min_tasks: usize,

    /// Maximum number of tasks (capped by the pool size)
    pub max_tasks: usize,

    /// Pool of names to draw from
    pub names: Vec<String>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            min_tasks: 5,
            max_tasks: 10,
            names: DEFAULT_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Summary of a generation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Generated {
    pub tasks: usize,
    pub relations: usize,
    pub attempts: usize,
}

/// Replaces the graph with a randomly generated one
pub fn generate<R: Rng>(
    graph: &mut DependencyGraph,
    rng: &mut R,
    options: &GenerateOptions,
) -> Generated {
    // Names are compared trimmed, the way the graph stores them
    let mut pool: Vec<&str> = options
        .names
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .collect();
    pool.sort_unstable();
    pool.dedup();
    pool.shuffle(rng);

    let max = options.max_tasks.min(pool.len());
    let min = options.min_tasks.min(max);
    let count = if max == 0 { 0 } else { rng.gen_range(min..=max) };
    let selected = &pool[..count];

    let mut scratch = DependencyGraph::new();
    for name in selected {
        scratch.add_task(name);
    }

    let attempts = if count < 2 { 0 } else { rng.gen_range(1..count) };
    for _ in 0..attempts {
        let from = selected[rng.gen_range(0..count)];
        let to = selected[rng.gen_range(0..count)];
        scratch.add_dependency(from, to);
    }

    let doc = scratch.to_document();
    graph.replace(doc.tasks, doc.relations);

    let generated = Generated {
        tasks: graph.len(),
        relations: graph.relations().len(),
        attempts,
    };
    debug!(
        tasks = generated.tasks,
        relations = generated.relations,
        attempts,
        "Generated random graph"
    );
    generated
}
