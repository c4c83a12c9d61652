//! Domain models for hasse
//!
//! The partial-order engine: the task graph with its acyclicity invariant,
//! the order analyses, chain enumeration and the cached snapshot. No I/O.

mod name;
mod graph;
mod order;
mod chains;
mod analysis;
mod generate;
mod diagram;

pub use name::{NameError, TaskName};
pub use graph::{DependencyGraph, GraphDocument, GraphError, Outcome, Rejection, Relation};
pub use order::{classify, maximal, minimal, notation, topological_order, TaskKind, EMPTY_SET};
pub use chains::{longest_chains, longest_chains_with_limit, DEFAULT_MAX_CHAINS};
pub use analysis::{AnalysisCache, AnalysisResult};
pub use generate::{generate, GenerateOptions, Generated, DEFAULT_NAMES};
pub use diagram::{to_dot, to_petgraph, DiagramError, Direction};
