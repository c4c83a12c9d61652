//! hasse - partial-order analysis for task dependencies
//!
//! Maintains a set of named tasks and "must precede" relations between
//! them, keeps the relation acyclic, and derives the minimal and maximal
//! tasks, a valid execution order and the longest dependency chains.

pub mod domain;
pub mod storage;
pub mod cli;

pub use domain::{AnalysisCache, AnalysisResult, DependencyGraph, Outcome, TaskName};
