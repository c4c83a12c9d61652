//! Graphviz export
//!
//! Renders tasks and relations as a DOT digraph for external diagram
//! tools. Nodes are coloured by their position in the order.

use petgraph::dot::{Config, Dot};
use petgraph::graph::DiGraph;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::graph::DependencyGraph;
use super::order::{classify, TaskKind};

#[derive(Debug, Error, PartialEq)]
pub enum DiagramError {
    #[error("Unknown layout direction '{0}', expected one of: tb, lr, bt, rl")]
    UnknownDirection(String),
}

/// Layout direction of the diagram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Top to bottom
    #[default]
    Tb,
    /// Left to right
    Lr,
    /// Bottom to top
    Bt,
    /// Right to left
    Rl,
}

impl Direction {
    fn rankdir(self) -> &'static str {
        match self {
            Direction::Tb => "TB",
            Direction::Lr => "LR",
            Direction::Bt => "BT",
            Direction::Rl => "RL",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rankdir().to_lowercase())
    }
}

impl FromStr for Direction {
    type Err = DiagramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tb" => Ok(Direction::Tb),
            "lr" => Ok(Direction::Lr),
            "bt" => Ok(Direction::Bt),
            "rl" => Ok(Direction::Rl),
            other => Err(DiagramError::UnknownDirection(other.to_string())),
        }
    }
}

fn fill_color(kind: TaskKind) -> &'static str {
    match kind {
        TaskKind::Isolated => "plum",
        TaskKind::Minimal => "palegreen",
        TaskKind::Maximal => "lightpink",
        TaskKind::Intermediate => "lightblue",
    }
}

/// Builds a petgraph view of the dependency graph, nodes in insertion order
///
/// Edges carry an empty label so the view can be rendered with [`Dot`].
pub fn to_petgraph(graph: &DependencyGraph) -> DiGraph<&str, &str> {
    let mut view = DiGraph::with_capacity(graph.len(), graph.relations().len());
    let mut nodes = HashMap::new();

    for task in graph.tasks() {
        nodes.insert(task.as_str(), view.add_node(task.as_str()));
    }

    for rel in graph.relations() {
        view.add_edge(nodes[rel.from.as_str()], nodes[rel.to.as_str()], "");
    }

    view
}

/// Renders the graph as a DOT digraph
pub fn to_dot(graph: &DependencyGraph, direction: Direction) -> String {
    let view = to_petgraph(graph);

    // The attribute getters are temporaries; render within this statement
    format!(
        "digraph {{\n    rankdir={}\n    node [shape=box]\n{}}}\n",
        direction.rankdir(),
        Dot::with_attr_getters(
            &view,
            &[Config::EdgeNoLabel, Config::GraphContentOnly],
            &|_, _| String::new(),
            &|_, (_, name)| {
                let kind = classify(graph, name).unwrap_or(TaskKind::Intermediate);
                format!("style=filled fillcolor={}", fill_color(kind))
            },
        )
    )
}
