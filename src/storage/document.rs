//! JSON storage for the graph and its cached analysis
//!
//! The graph lives in `.hasse/graph.json` as a [`GraphDocument`] and the
//! last recomputed analysis in `.hasse/analysis.json`. Reads take a shared
//! lock, writes go through a locked temp file and an atomic rename.

use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::config::PROJECT_DIR;
use crate::domain::{AnalysisResult, DependencyGraph, GraphDocument};

/// Store for the dependency graph
pub struct GraphStore {
    path: PathBuf,
}

impl GraphStore {
    /// Creates a new graph store at the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates the default store for a project
    pub fn for_project(project_root: &Path) -> Self {
        Self::new(project_root.join(PROJECT_DIR).join("graph.json"))
    }

    /// Returns the path to the store file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the graph; a missing file is an empty graph
    pub fn read(&self) -> Result<DependencyGraph> {
        let doc: GraphDocument = read_json(&self.path)?.unwrap_or_default();
        DependencyGraph::try_from(doc)
            .with_context(|| format!("Invalid graph in {}", self.path.display()))
    }

    /// Writes the graph (full rewrite)
    pub fn write(&self, graph: &DependencyGraph) -> Result<()> {
        write_json(&self.path, &graph.to_document())
    }
}

/// Store for the last computed analysis
pub struct AnalysisStore {
    path: PathBuf,
}

impl AnalysisStore {
    /// Creates a new analysis store at the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates the default store for a project
    pub fn for_project(project_root: &Path) -> Self {
        Self::new(project_root.join(PROJECT_DIR).join("analysis.json"))
    }

    /// Returns the path to the store file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the cached analysis, if one was ever stored
    pub fn read(&self) -> Result<Option<AnalysisResult>> {
        read_json(&self.path)
    }

    /// Writes the analysis (full rewrite)
    pub fn write(&self, result: &AnalysisResult) -> Result<()> {
        write_json(&self.path, result)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }

    let file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;

    // Acquire shared lock for reading
    file.lock_shared()
        .with_context(|| format!("Failed to acquire read lock on {}", path.display()))?;

    let value = serde_json::from_reader(BufReader::new(&file))
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    // Lock is released when file is dropped
    Ok(Some(value))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    // Write to temp file first
    let temp_path = path.with_extension("json.tmp");

    {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

        // Acquire exclusive lock
        file.lock_exclusive()
            .with_context(|| format!("Failed to acquire write lock on {}", temp_path.display()))?;

        let mut writer = BufWriter::new(&file);
        serde_json::to_writer_pretty(&mut writer, value)
            .with_context(|| format!("Failed to serialize {}", path.display()))?;
        writeln!(writer).context("Failed to write trailing newline")?;
        writer
            .flush()
            .with_context(|| format!("Failed to flush {}", temp_path.display()))?;
    }

    // Atomic rename
    fs::rename(&temp_path, path).with_context(|| {
        format!(
            "Failed to rename {} to {}",
            temp_path.display(),
            path.display()
        )
    })?;

    Ok(())
}
