//! # Storage Layer
//!
//! Keeps a graph between CLI invocations. The domain has no persistence of
//! its own; this layer stores the plain document form of the graph.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Graph | JSON (`tasks` + `relations` pairs) | `.hasse/graph.json` |
//! | Analysis | JSON (last recompute) | `.hasse/analysis.json` |
//! | Config | TOML | `.hasse/config.toml` |
//!
//! All writes are atomic (temp file + rename) and locked with `fs2`.
//!
//! ## Key Types
//!
//! - [`Project`] - Entry point for accessing a hasse project
//! - [`GraphStore`] - Read/write the dependency graph
//! - [`AnalysisStore`] - Read/write the cached analysis
//! - [`Config`] - Project and global configuration

mod config;
mod document;
mod project;

pub use config::{
    Config, ConfigError, DiagramConfig, GlobalConfig, OutputFormat, ProjectConfig, PROJECT_DIR,
};
pub use document::{AnalysisStore, GraphStore};
pub use project::{Project, ProjectError};
