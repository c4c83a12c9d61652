//! Partial-order analysis over a graph snapshot
//!
//! Minimal and maximal tasks, a deterministic topological order, and the
//! set notation of the relation. All functions are pure.

use serde::Serialize;
use std::collections::VecDeque;
use tracing::trace;

use super::graph::DependencyGraph;
use super::name::TaskName;

/// Marker rendered for an empty relation set
pub const EMPTY_SET: &str = "{}";

/// Position of a task in the order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// No predecessors, has successors
    Minimal,
    /// No successors, has predecessors
    Maximal,
    /// Neither predecessors nor successors
    Isolated,
    Intermediate,
}

impl TaskKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskKind::Minimal => "minimal",
            TaskKind::Maximal => "maximal",
            TaskKind::Isolated => "isolated",
            TaskKind::Intermediate => "intermediate",
        }
    }
}

/// Tasks with no incoming relation, in insertion order
pub fn minimal(graph: &DependencyGraph) -> Vec<TaskName> {
    let index = graph.index();
    index
        .names
        .iter()
        .zip(&index.in_degree)
        .filter(|&(_, &deg)| deg == 0)
        .map(|(task, _)| task.clone())
        .collect()
}

/// Tasks with no outgoing relation, in insertion order
pub fn maximal(graph: &DependencyGraph) -> Vec<TaskName> {
    let index = graph.index();
    index
        .names
        .iter()
        .zip(&index.successors)
        .filter(|(_, succ)| succ.is_empty())
        .map(|(task, _)| task.clone())
        .collect()
}

/// Classifies a task, or `None` if it is not in the graph
pub fn classify(graph: &DependencyGraph, name: &str) -> Option<TaskKind> {
    if !graph.contains(name) {
        return None;
    }

    let has_pred = graph.predecessors(name).next().is_some();
    let has_succ = graph.successors(name).next().is_some();

    Some(match (has_pred, has_succ) {
        (false, false) => TaskKind::Isolated,
        (false, true) => TaskKind::Minimal,
        (true, false) => TaskKind::Maximal,
        (true, true) => TaskKind::Intermediate,
    })
}

/// Kahn's algorithm with a FIFO queue
///
/// The queue is seeded with in-degree zero tasks in insertion order and
/// successors are visited in relation insertion order, so the result is
/// fully determined by the graph's construction history.
///
/// # Panics
///
/// Panics if the order does not cover every task. The graph never admits a
/// cycle, so this only fires on a broken invariant.
pub fn topological_order(graph: &DependencyGraph) -> Vec<TaskName> {
    let index = graph.index();
    let mut in_degree = index.in_degree.clone();

    let mut queue: VecDeque<usize> = in_degree
        .iter()
        .enumerate()
        .filter(|&(_, &deg)| deg == 0)
        .map(|(i, _)| i)
        .collect();

    let mut order = Vec::with_capacity(index.names.len());

    while let Some(current) = queue.pop_front() {
        trace!(task = %index.names[current], "Dequeued");
        order.push(index.names[current].clone());

        for &next in &index.successors[current] {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                queue.push_back(next);
            }
        }
    }

    assert_eq!(
        order.len(),
        index.names.len(),
        "topological order covers {} of {} tasks; dependency graph contains a cycle",
        order.len(),
        index.names.len()
    );

    order
}

/// Renders the relation set, e.g. `{(A, B), (B, C)}`
pub fn notation(graph: &DependencyGraph) -> String {
    if graph.relations().is_empty() {
        return EMPTY_SET.to_string();
    }

    let pairs: Vec<String> = graph.relations().iter().map(|rel| rel.to_string()).collect();
    format!("{{{}}}", pairs.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strs(names: &[TaskName]) -> Vec<&str> {
        names.iter().map(|t| t.as_str()).collect()
    }

    fn graph(tasks: &[&str], relations: &[(&str, &str)]) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for task in tasks {
            graph.add_task(task);
        }
        for (from, to) in relations {
            assert!(graph.add_dependency(from, to).is_applied());
        }
        graph
    }

    fn diamond() -> DependencyGraph {
        graph(
            &["A", "B", "C", "D"],
            &[("A", "B"), ("B", "D"), ("A", "C"), ("C", "D")],
        )
    }

    #[test]
    fn minimal_and_maximal() {
        let graph = diamond();
        assert_eq!(strs(&minimal(&graph)), vec!["A"]);
        assert_eq!(strs(&maximal(&graph)), vec!["D"]);
    }

    #[test]
    fn isolated_task_is_both() {
        let graph = graph(&["A", "B", "Z"], &[("A", "B")]);
        assert_eq!(strs(&minimal(&graph)), vec!["A", "Z"]);
        assert_eq!(strs(&maximal(&graph)), vec!["B", "Z"]);
        assert_eq!(classify(&graph, "Z"), Some(TaskKind::Isolated));
    }

    #[test]
    fn classify_tasks() {
        let graph = diamond();
        assert_eq!(classify(&graph, "A"), Some(TaskKind::Minimal));
        assert_eq!(classify(&graph, "B"), Some(TaskKind::Intermediate));
        assert_eq!(classify(&graph, "D"), Some(TaskKind::Maximal));
        assert_eq!(classify(&graph, "Q"), None);
    }

    #[test]
    fn topological_order_diamond() {
        assert_eq!(strs(&topological_order(&diamond())), vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn topological_order_follows_fifo_arrival() {
        // C is enqueued before B because A -> C was added first
        let graph = graph(&["A", "B", "C"], &[("A", "C"), ("A", "B")]);
        assert_eq!(strs(&topological_order(&graph)), vec!["A", "C", "B"]);
    }

    #[test]
    fn topological_order_seeds_in_insertion_order() {
        let graph = graph(&["X", "A", "Y"], &[("Y", "A")]);
        assert_eq!(strs(&topological_order(&graph)), vec!["X", "Y", "A"]);
    }

    #[test]
    fn topological_order_respects_edges() {
        let graph = graph(
            &["E", "D", "C", "B", "A"],
            &[("A", "B"), ("B", "C"), ("C", "D"), ("D", "E"), ("A", "E")],
        );
        let order = topological_order(&graph);
        assert_eq!(strs(&order), vec!["A", "B", "C", "D", "E"]);
    }

    #[test]
    fn notation_lists_pairs_in_insertion_order() {
        assert_eq!(notation(&diamond()), "{(A, B), (B, D), (A, C), (C, D)}");
    }

    #[test]
    fn empty_graph() {
        let graph = DependencyGraph::new();
        assert!(minimal(&graph).is_empty());
        assert!(maximal(&graph).is_empty());
        assert!(topological_order(&graph).is_empty());
        assert_eq!(notation(&graph), EMPTY_SET);
    }

    #[test]
    fn tasks_without_relations_render_empty_set() {
        let graph = graph(&["A", "B"], &[]);
        assert_eq!(notation(&graph), "{}");
        assert_eq!(strs(&topological_order(&graph)), vec!["A", "B"]);
    }
}
