//! Project management
//!
//! Handles project initialization and provides access to stores.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use super::config::PROJECT_DIR;
use super::{AnalysisStore, Config, GraphStore};
use crate::domain::{AnalysisCache, DependencyGraph};

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Not in a hasse project. Run 'hasse init' first.")]
    NotInProject,
}

const DEFAULT_CONFIG: &str = r#"# hasse configuration

# Number of longest chains kept by 'hasse analyze'
max_chains = 5

[generate]
# Bounds on the number of tasks created by 'hasse generate'
min_tasks = 5
max_tasks = 10

[diagram]
# Layout direction for 'hasse diagram': tb, lr, bt or rl
direction = "tb"
"#;

/// A hasse project
pub struct Project {
    root: PathBuf,
    config: Config,
}

impl Project {
    /// Opens an existing project at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        if !root.join(PROJECT_DIR).is_dir() {
            return Err(ProjectError::NotInProject.into());
        }

        let config = Config::for_project(&root)?;

        Ok(Self { root, config })
    }

    /// Opens the project at the current directory or a parent
    pub fn open_current() -> Result<Self> {
        let root = Config::find_project_root().ok_or(ProjectError::NotInProject)?;

        Self::open(root)
    }

    /// Initializes a new project at the given path. Existing files are kept.
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let project_dir = root.join(PROJECT_DIR);

        fs::create_dir_all(&project_dir).with_context(|| {
            format!("Failed to create {} directory: {}", PROJECT_DIR, project_dir.display())
        })?;

        let config_path = project_dir.join("config.toml");
        if !config_path.exists() {
            fs::write(&config_path, DEFAULT_CONFIG)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        let graphs = GraphStore::for_project(&root);
        if !graphs.path().exists() {
            graphs.write(&DependencyGraph::new())?;
        }

        Self::open(root)
    }

    /// Returns the project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the `.hasse` directory
    pub fn project_dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR)
    }

    /// Returns the project configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the graph store for this project
    pub fn graph_store(&self) -> GraphStore {
        GraphStore::for_project(&self.root)
    }

    /// Returns the analysis store for this project
    pub fn analysis_store(&self) -> AnalysisStore {
        AnalysisStore::for_project(&self.root)
    }

    /// Loads the dependency graph
    pub fn load_graph(&self) -> Result<DependencyGraph> {
        self.graph_store().read()
    }

    /// Saves the dependency graph
    pub fn save_graph(&self, graph: &DependencyGraph) -> Result<()> {
        self.graph_store().write(graph)
    }

    /// Loads the analysis cache, empty if nothing was computed yet
    pub fn load_cache(&self) -> Result<AnalysisCache> {
        let max_chains = self.config.project.max_chains;
        Ok(match self.analysis_store().read()? {
            Some(result) => AnalysisCache::from_result(result, max_chains),
            None => AnalysisCache::with_max_chains(max_chains),
        })
    }

    /// Saves the analysis cache snapshot
    pub fn save_cache(&self, cache: &AnalysisCache) -> Result<()> {
        self.analysis_store().write(cache.result())
    }
}
