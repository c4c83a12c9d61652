//! Dependency graph for tasks
//!
//! Owns the ordered set of tasks and the ordered set of "must precede"
//! relations between them. Every mutation keeps the graph a DAG: no
//! self-loops, no duplicate edges, no cycles, and both endpoints of every
//! relation are known tasks.
//!
//! Invalid mutations are no-ops. Each mutation returns an [`Outcome`] so
//! callers can see why a request was rejected.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use thiserror::Error;
use tracing::{debug, trace};

use super::name::TaskName;

#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("Invalid graph document: {entry} was {outcome}")]
    InvalidDocument { entry: String, outcome: Outcome },
}

/// Result of a mutation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Applied,
    RejectedEmptyName,
    RejectedDuplicateTask,
    RejectedSelfLoop,
    RejectedDuplicateEdge,
    RejectedUnknownTask,
    RejectedWouldCreateCycle,
    RejectedUnknownRemoval,
}

impl Outcome {
    /// Returns true if the mutation changed the graph
    pub fn is_applied(self) -> bool {
        self == Outcome::Applied
    }

    /// Short human-readable description
    pub fn describe(self) -> &'static str {
        match self {
            Outcome::Applied => "applied",
            Outcome::RejectedEmptyName => "rejected: task name is empty",
            Outcome::RejectedDuplicateTask => "rejected: task already exists",
            Outcome::RejectedSelfLoop => "rejected: a task cannot precede itself",
            Outcome::RejectedDuplicateEdge => "rejected: dependency already exists",
            Outcome::RejectedUnknownTask => "rejected: unknown task",
            Outcome::RejectedWouldCreateCycle => "rejected: dependency would create a cycle",
            Outcome::RejectedUnknownRemoval => "rejected: nothing to remove",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// A precedence relation: `from` must complete before `to`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relation {
    pub from: TaskName,
    pub to: TaskName,
}

impl Relation {
    fn matches(&self, from: &str, to: &str) -> bool {
        self.from.as_str() == from && self.to.as_str() == to
    }

    fn mentions(&self, name: &str) -> bool {
        self.from.as_str() == name || self.to.as_str() == name
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.from, self.to)
    }
}

/// An entry of a bulk replace that was not applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub entry: String,
    pub outcome: Outcome,
}

/// Plain serializable form of a graph: a list of names plus a list of pairs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphDocument {
    /// Revision of the graph when it was written
    #[serde(default)]
    pub revision: u64,

    pub tasks: Vec<String>,

    #[serde(default)]
    pub relations: Vec<(String, String)>,
}

/// A dependency graph for tasks
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Tasks in insertion order
    tasks: Vec<TaskName>,

    /// Relations in insertion order
    relations: Vec<Relation>,

    /// Bumped on every applied mutation
    revision: u64,
}

impl DependencyGraph {
    /// Creates an empty dependency graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a task. Names are trimmed; empty or existing names are no-ops.
    pub fn add_task(&mut self, name: &str) -> Outcome {
        let name = match TaskName::new(name) {
            Ok(name) => name,
            Err(_) => return self.reject("add_task", name, Outcome::RejectedEmptyName),
        };

        if self.contains(name.as_str()) {
            return self.reject("add_task", name.as_str(), Outcome::RejectedDuplicateTask);
        }

        debug!(task = %name, "Added task");
        self.tasks.push(name);
        self.bump();
        Outcome::Applied
    }

    /// Removes a task and every relation that mentions it
    pub fn remove_task(&mut self, name: &str) -> Outcome {
        let name = name.trim();
        let Some(pos) = self.position(name) else {
            return self.reject("remove_task", name, Outcome::RejectedUnknownRemoval);
        };

        self.tasks.remove(pos);
        let before = self.relations.len();
        self.relations.retain(|rel| !rel.mentions(name));

        debug!(
            task = name,
            cascaded = before - self.relations.len(),
            "Removed task"
        );
        self.bump();
        Outcome::Applied
    }

    /// Adds the relation `from -> to` ("from must complete before to")
    ///
    /// Rejected without any state change when it is a self-loop, names an
    /// unknown task, duplicates an existing relation, or would close a cycle.
    pub fn add_dependency(&mut self, from: &str, to: &str) -> Outcome {
        let (from, to) = (from.trim(), to.trim());
        let pair = format!("({}, {})", from, to);

        if from == to {
            return self.reject("add_dependency", &pair, Outcome::RejectedSelfLoop);
        }

        let (Some(from_pos), Some(to_pos)) = (self.position(from), self.position(to)) else {
            return self.reject("add_dependency", &pair, Outcome::RejectedUnknownTask);
        };

        if self.has_dependency(from, to) {
            return self.reject("add_dependency", &pair, Outcome::RejectedDuplicateEdge);
        }

        if self.would_create_cycle(from, to) {
            return self.reject("add_dependency", &pair, Outcome::RejectedWouldCreateCycle);
        }

        debug!(from, to, "Added dependency");
        self.relations.push(Relation {
            from: self.tasks[from_pos].clone(),
            to: self.tasks[to_pos].clone(),
        });
        self.bump();
        Outcome::Applied
    }

    /// Removes the exact relation `from -> to`
    pub fn remove_dependency(&mut self, from: &str, to: &str) -> Outcome {
        let (from, to) = (from.trim(), to.trim());
        let Some(pos) = self.relations.iter().position(|rel| rel.matches(from, to)) else {
            let pair = format!("({}, {})", from, to);
            return self.reject("remove_dependency", &pair, Outcome::RejectedUnknownRemoval);
        };

        self.relations.remove(pos);
        debug!(from, to, "Removed dependency");
        self.bump();
        Outcome::Applied
    }

    /// Returns true if adding `from -> to` would close a directed cycle
    ///
    /// Runs a depth-first search from every node of the hypothetical edge
    /// set (current relations plus the candidate), so disconnected
    /// components are covered. Uses an explicit stack rather than recursion.
    pub fn would_create_cycle(&self, from: &str, to: &str) -> bool {
        let (from, to) = (from.trim(), to.trim());

        let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
        let mut nodes: Vec<&str> = Vec::new();
        let candidate = std::iter::once((from, to));
        let edges = self
            .relations
            .iter()
            .map(|rel| (rel.from.as_str(), rel.to.as_str()))
            .chain(candidate);

        for (a, b) in edges {
            adjacency.entry(a).or_default().push(b);
            nodes.push(a);
            nodes.push(b);
        }

        has_cycle(&nodes, &adjacency)
    }

    /// Removes every task and relation
    pub fn clear(&mut self) {
        debug!(
            tasks = self.tasks.len(),
            relations = self.relations.len(),
            "Cleared graph"
        );
        self.tasks.clear();
        self.relations.clear();
        self.bump();
    }

    /// Replaces the whole graph, applying each entry with the usual
    /// rejection rules. Returns the entries that were not applied.
    pub fn replace<T, R, S>(&mut self, tasks: T, relations: R) -> Vec<Rejection>
    where
        T: IntoIterator<Item = S>,
        R: IntoIterator<Item = (S, S)>,
        S: AsRef<str>,
    {
        self.clear();
        let mut rejections = Vec::new();

        for name in tasks {
            let outcome = self.add_task(name.as_ref());
            if !outcome.is_applied() {
                rejections.push(Rejection {
                    entry: name.as_ref().to_string(),
                    outcome,
                });
            }
        }

        for (from, to) in relations {
            let outcome = self.add_dependency(from.as_ref(), to.as_ref());
            if !outcome.is_applied() {
                rejections.push(Rejection {
                    entry: format!("({}, {})", from.as_ref(), to.as_ref()),
                    outcome,
                });
            }
        }

        rejections
    }

    /// Returns true if the exact relation `from -> to` exists
    pub fn has_dependency(&self, from: &str, to: &str) -> bool {
        self.relations.iter().any(|rel| rel.matches(from, to))
    }

    /// Returns true if the graph contains the task
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Tasks in insertion order
    pub fn tasks(&self) -> &[TaskName] {
        &self.tasks
    }

    /// Relations in insertion order
    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    /// Direct successors of a task, in relation insertion order
    pub fn successors<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a TaskName> + 'a {
        self.relations
            .iter()
            .filter(move |rel| rel.from.as_str() == name)
            .map(|rel| &rel.to)
    }

    /// Direct predecessors of a task, in relation insertion order
    pub fn predecessors<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a TaskName> + 'a {
        self.relations
            .iter()
            .filter(move |rel| rel.to.as_str() == name)
            .map(|rel| &rel.from)
    }

    /// Returns the number of tasks in the graph
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns true if the graph has no tasks
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Revision counter, bumped on every applied mutation
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Converts the graph into its plain serializable form
    pub fn to_document(&self) -> GraphDocument {
        GraphDocument {
            revision: self.revision,
            tasks: self.tasks.iter().map(|t| t.to_string()).collect(),
            relations: self
                .relations
                .iter()
                .map(|rel| (rel.from.to_string(), rel.to.to_string()))
                .collect(),
        }
    }

    /// Builds the positional index used by the analysis algorithms
    pub(crate) fn index(&self) -> GraphIndex<'_> {
        let positions: HashMap<&str, usize> = self
            .tasks
            .iter()
            .enumerate()
            .map(|(i, t)| (t.as_str(), i))
            .collect();

        let mut successors = vec![Vec::new(); self.tasks.len()];
        let mut in_degree = vec![0; self.tasks.len()];

        for rel in &self.relations {
            let from = positions[rel.from.as_str()];
            let to = positions[rel.to.as_str()];
            successors[from].push(to);
            in_degree[to] += 1;
        }

        GraphIndex {
            names: &self.tasks,
            successors,
            in_degree,
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.tasks.iter().position(|t| t.as_str() == name)
    }

    fn bump(&mut self) {
        self.revision += 1;
    }

    fn reject(&self, op: &str, entry: &str, outcome: Outcome) -> Outcome {
        debug!(op, entry, %outcome, "Mutation rejected");
        outcome
    }
}

impl TryFrom<GraphDocument> for DependencyGraph {
    type Error = GraphError;

    /// Rebuilds a graph; fails if any entry would be rejected, so a loaded
    /// graph is exactly the one that was written.
    fn try_from(doc: GraphDocument) -> Result<Self, Self::Error> {
        let mut graph = Self::new();

        for name in &doc.tasks {
            let outcome = graph.add_task(name);
            if !outcome.is_applied() {
                return Err(GraphError::InvalidDocument {
                    entry: format!("task '{}'", name),
                    outcome,
                });
            }
        }

        for (from, to) in &doc.relations {
            let outcome = graph.add_dependency(from, to);
            if !outcome.is_applied() {
                return Err(GraphError::InvalidDocument {
                    entry: format!("relation ({}, {})", from, to),
                    outcome,
                });
            }
        }

        graph.revision = graph.revision.max(doc.revision);
        Ok(graph)
    }
}

/// Positional view of a graph: task `i` is `names[i]`
pub(crate) struct GraphIndex<'a> {
    pub names: &'a [TaskName],
    /// Successor positions per task, in relation insertion order
    pub successors: Vec<Vec<usize>>,
    pub in_degree: Vec<usize>,
}

/// Iterative DFS cycle check over an explicit adjacency map
fn has_cycle<'a>(nodes: &[&'a str], adjacency: &HashMap<&'a str, Vec<&'a str>>) -> bool {
    let mut explored: HashSet<&str> = HashSet::new();
    let mut on_stack: HashSet<&str> = HashSet::new();

    for &start in nodes {
        if explored.contains(start) {
            continue;
        }

        explored.insert(start);
        on_stack.insert(start);
        let mut stack: Vec<(&str, usize)> = vec![(start, 0)];

        while let Some(frame) = stack.last_mut() {
            let node = frame.0;
            let children = adjacency.get(node).map(Vec::as_slice).unwrap_or(&[]);

            match children.get(frame.1) {
                Some(&child) => {
                    frame.1 += 1;
                    if on_stack.contains(child) {
                        trace!(node, child, "Back edge found");
                        return true;
                    }
                    if explored.insert(child) {
                        on_stack.insert(child);
                        stack.push((child, 0));
                    }
                }
                None => {
                    on_stack.remove(node);
                    stack.pop();
                }
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(graph: &DependencyGraph) -> Vec<&str> {
        graph.tasks().iter().map(|t| t.as_str()).collect()
    }

    fn pairs(graph: &DependencyGraph) -> Vec<(&str, &str)> {
        graph
            .relations()
            .iter()
            .map(|r| (r.from.as_str(), r.to.as_str()))
            .collect()
    }

    fn diamond() -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for name in ["A", "B", "C", "D"] {
            graph.add_task(name);
        }
        graph.add_dependency("A", "B");
        graph.add_dependency("B", "D");
        graph.add_dependency("A", "C");
        graph.add_dependency("C", "D");
        graph
    }

    #[test]
    fn empty_graph() {
        let graph = DependencyGraph::new();
        assert!(graph.is_empty());
        assert_eq!(graph.len(), 0);
        assert_eq!(graph.revision(), 0);
    }

    #[test]
    fn add_tasks_in_order() {
        let mut graph = DependencyGraph::new();
        assert_eq!(graph.add_task("B"), Outcome::Applied);
        assert_eq!(graph.add_task("  A  "), Outcome::Applied);

        assert_eq!(names(&graph), vec!["B", "A"]);
        assert!(graph.contains("A"));
    }

    #[test]
    fn add_task_is_idempotent() {
        let mut graph = DependencyGraph::new();
        graph.add_task("A");
        let revision = graph.revision();

        assert_eq!(graph.add_task(" A"), Outcome::RejectedDuplicateTask);
        assert_eq!(graph.add_task("   "), Outcome::RejectedEmptyName);
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.revision(), revision);
    }

    #[test]
    fn add_dependency() {
        let graph = diamond();
        assert_eq!(
            pairs(&graph),
            vec![("A", "B"), ("B", "D"), ("A", "C"), ("C", "D")]
        );
        let succ: Vec<_> = graph.successors("A").map(|t| t.as_str()).collect();
        assert_eq!(succ, vec!["B", "C"]);
        let pred: Vec<_> = graph.predecessors("D").map(|t| t.as_str()).collect();
        assert_eq!(pred, vec!["B", "C"]);
    }

    #[test]
    fn self_dependency_rejected() {
        let mut graph = DependencyGraph::new();
        graph.add_task("A");
        assert_eq!(graph.add_dependency("A", "A"), Outcome::RejectedSelfLoop);
        assert!(graph.relations().is_empty());
    }

    #[test]
    fn unknown_task_rejected() {
        let mut graph = DependencyGraph::new();
        graph.add_task("A");
        assert_eq!(graph.add_dependency("A", "B"), Outcome::RejectedUnknownTask);
        assert_eq!(graph.add_dependency("", "A"), Outcome::RejectedUnknownTask);
        assert!(graph.relations().is_empty());
    }

    #[test]
    fn duplicate_edge_rejected() {
        let mut graph = diamond();
        let revision = graph.revision();
        assert_eq!(graph.add_dependency("A", "B"), Outcome::RejectedDuplicateEdge);
        assert_eq!(graph.relations().len(), 4);
        assert_eq!(graph.revision(), revision);
    }

    #[test]
    fn cycle_rejected() {
        let mut graph = diamond();
        let before = pairs(&graph).len();

        assert!(graph.would_create_cycle("D", "A"));
        assert_eq!(
            graph.add_dependency("D", "A"),
            Outcome::RejectedWouldCreateCycle
        );
        assert_eq!(pairs(&graph).len(), before);
    }

    #[test]
    fn two_cycle_rejected() {
        let mut graph = DependencyGraph::new();
        graph.add_task("A");
        graph.add_task("B");
        graph.add_dependency("A", "B");
        assert!(graph.would_create_cycle("B", "A"));
        assert_eq!(
            graph.add_dependency("B", "A"),
            Outcome::RejectedWouldCreateCycle
        );
    }

    #[test]
    fn acyclic_candidate_is_not_a_cycle() {
        let graph = diamond();
        assert!(!graph.would_create_cycle("A", "D"));
        assert!(!graph.would_create_cycle("B", "C"));
    }

    #[test]
    fn cycle_check_covers_disconnected_components() {
        let mut graph = DependencyGraph::new();
        for name in ["A", "B", "X", "Y", "Z"] {
            graph.add_task(name);
        }
        graph.add_dependency("A", "B");
        graph.add_dependency("X", "Y");
        graph.add_dependency("Y", "Z");

        assert!(graph.would_create_cycle("Z", "X"));
        assert!(!graph.would_create_cycle("B", "X"));
    }

    #[test]
    fn cycle_check_handles_long_chains() {
        let mut graph = DependencyGraph::new();
        let names: Vec<String> = (0..5_000).map(|i| format!("t{}", i)).collect();
        for name in &names {
            graph.add_task(name);
        }
        for pair in names.windows(2) {
            graph.relations.push(Relation {
                from: TaskName::new(&pair[0]).unwrap(),
                to: TaskName::new(&pair[1]).unwrap(),
            });
        }

        assert!(graph.would_create_cycle("t4999", "t0"));
        assert!(!graph.would_create_cycle("t0", "t4999"));
    }

    #[test]
    fn remove_task_cascades() {
        let mut graph = diamond();
        assert_eq!(graph.remove_task("B"), Outcome::Applied);

        assert_eq!(names(&graph), vec!["A", "C", "D"]);
        assert_eq!(pairs(&graph), vec![("A", "C"), ("C", "D")]);
    }

    #[test]
    fn remove_unknown_task() {
        let mut graph = diamond();
        let revision = graph.revision();
        assert_eq!(graph.remove_task("Q"), Outcome::RejectedUnknownRemoval);
        assert_eq!(graph.len(), 4);
        assert_eq!(graph.revision(), revision);
    }

    #[test]
    fn remove_dependency() {
        let mut graph = diamond();
        assert_eq!(graph.remove_dependency("A", "B"), Outcome::Applied);
        assert!(!graph.has_dependency("A", "B"));
        assert_eq!(
            graph.remove_dependency("A", "B"),
            Outcome::RejectedUnknownRemoval
        );
        assert_eq!(
            graph.remove_dependency("B", "A"),
            Outcome::RejectedUnknownRemoval
        );
    }

    #[test]
    fn clear_resets() {
        let mut graph = diamond();
        let revision = graph.revision();
        graph.clear();

        assert!(graph.is_empty());
        assert!(graph.relations().is_empty());
        assert!(graph.revision() > revision);
    }

    #[test]
    fn replace_reports_rejections() {
        let mut graph = diamond();
        let rejections = graph.replace(
            ["X", "Y", "X", " "],
            [("X", "Y"), ("Y", "X"), ("X", "X"), ("X", "Q")],
        );

        assert_eq!(names(&graph), vec!["X", "Y"]);
        assert_eq!(pairs(&graph), vec![("X", "Y")]);

        let outcomes: Vec<_> = rejections.iter().map(|r| r.outcome).collect();
        assert_eq!(
            outcomes,
            vec![
                Outcome::RejectedDuplicateTask,
                Outcome::RejectedEmptyName,
                Outcome::RejectedWouldCreateCycle,
                Outcome::RejectedSelfLoop,
                Outcome::RejectedUnknownTask,
            ]
        );
    }

    #[test]
    fn revision_tracks_applied_mutations() {
        let mut graph = DependencyGraph::new();
        graph.add_task("A");
        graph.add_task("B");
        graph.add_dependency("A", "B");
        assert_eq!(graph.revision(), 3);

        graph.add_dependency("B", "A");
        assert_eq!(graph.revision(), 3);

        graph.remove_dependency("A", "B");
        assert_eq!(graph.revision(), 4);
    }

    #[test]
    fn document_roundtrip() {
        let graph = diamond();
        let doc = graph.to_document();
        assert_eq!(doc.tasks, vec!["A", "B", "C", "D"]);

        let json = serde_json::to_string(&doc).unwrap();
        let parsed: GraphDocument = serde_json::from_str(&json).unwrap();
        let restored = DependencyGraph::try_from(parsed).unwrap();

        assert_eq!(names(&restored), names(&graph));
        assert_eq!(pairs(&restored), pairs(&graph));
        assert_eq!(restored.revision(), graph.revision());
    }

    #[test]
    fn document_with_cycle_is_invalid() {
        let doc = GraphDocument {
            revision: 0,
            tasks: vec!["A".into(), "B".into()],
            relations: vec![("A".into(), "B".into()), ("B".into(), "A".into())],
        };

        let result = DependencyGraph::try_from(doc);
        assert!(matches!(
            result,
            Err(GraphError::InvalidDocument {
                outcome: Outcome::RejectedWouldCreateCycle,
                ..
            })
        ));
    }

    #[test]
    fn document_without_revision_parses() {
        let json = r#"{"tasks": ["A", "B"], "relations": [["A", "B"]]}"#;
        let doc: GraphDocument = serde_json::from_str(json).unwrap();
        let graph = DependencyGraph::try_from(doc).unwrap();

        assert_eq!(pairs(&graph), vec![("A", "B")]);
        assert_eq!(graph.revision(), 3);
    }

    #[test]
    fn index_positions() {
        let graph = diamond();
        let index = graph.index();
        assert_eq!(index.in_degree, vec![0, 1, 1, 2]);
        assert_eq!(index.successors[0], vec![1, 2]);
        assert_eq!(index.successors[3], Vec::<usize>::new());
    }
}
