//! Configuration handling for hasse
//!
//! Configuration is stored in `.hasse/config.toml` (project) and
//! `~/.config/hasse/config.toml` (global).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Direction, GenerateOptions, DEFAULT_MAX_CHAINS};

/// Name of the project directory
pub const PROJECT_DIR: &str = ".hasse";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Diagram export settings
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct DiagramConfig {
    /// Default layout direction
    pub direction: Direction,
}

/// Project-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProjectConfig {
    /// Number of chains kept by `analyze`
    pub max_chains: usize,

    /// Random generation settings
    pub generate: GenerateOptions,

    /// Diagram settings
    pub diagram: DiagramConfig,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            max_chains: DEFAULT_MAX_CHAINS,
            generate: GenerateOptions::default(),
            diagram: DiagramConfig::default(),
        }
    }
}

impl ProjectConfig {
    /// Checks values that parse but make no sense
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_chains == 0 {
            return Err(ConfigError::Invalid("max_chains must be at least 1".into()));
        }
        if self.generate.min_tasks > self.generate.max_tasks {
            return Err(ConfigError::Invalid(format!(
                "generate.min_tasks ({}) exceeds generate.max_tasks ({})",
                self.generate.min_tasks, self.generate.max_tasks
            )));
        }
        Ok(())
    }
}

/// Global user configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GlobalConfig {
    /// Default output format (text or json)
    pub default_format: OutputFormat,
}

/// Output format for commands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Combined configuration (global + project)
#[derive(Debug, Clone)]
pub struct Config {
    pub project: ProjectConfig,
    pub global: GlobalConfig,
    pub project_root: Option<PathBuf>,
}

impl Config {
    /// Loads configuration from default locations
    pub fn load() -> Result<Self> {
        let global = Self::load_global()?;
        let project_root = Self::find_project_root();
        let project = match &project_root {
            Some(root) => Self::load_project_config(root)?,
            None => ProjectConfig::default(),
        };

        Ok(Self {
            project,
            global,
            project_root,
        })
    }

    /// Loads configuration for a specific project
    pub fn for_project(project_root: &Path) -> Result<Self> {
        let global = Self::load_global()?;
        let project = Self::load_project_config(project_root)?;

        Ok(Self {
            project,
            global,
            project_root: Some(project_root.to_path_buf()),
        })
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "hasse", "hasse").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Loads global configuration
    fn load_global() -> Result<GlobalConfig> {
        let config_dir = match Self::global_config_dir() {
            Some(dir) => dir,
            None => return Ok(GlobalConfig::default()),
        };

        let config_path = config_dir.join("config.toml");
        if !config_path.exists() {
            return Ok(GlobalConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read global config: {}", config_path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse global config")
    }

    /// Loads project configuration from a specific root
    fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
        let config_path = project_root.join(PROJECT_DIR).join("config.toml");

        if !config_path.exists() {
            return Ok(ProjectConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read project config: {}", config_path.display()))?;

        Self::parse_project_config(&content).context("Failed to parse project config")
    }

    /// Parses and validates project configuration
    pub fn parse_project_config(content: &str) -> Result<ProjectConfig, ConfigError> {
        let config: ProjectConfig =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Finds the project root by looking for `.hasse/` from the current directory
    pub fn find_project_root() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::find_project_root_from(&current)
    }

    /// Finds the project root by looking for `.hasse/` in `start` or a parent
    pub fn find_project_root_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();

        loop {
            if current.join(PROJECT_DIR).is_dir() {
                return Some(current);
            }

            if !current.pop() {
                return None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config() {
        let config = ProjectConfig::default();
        assert_eq!(config.max_chains, 5);
        assert_eq!(config.generate.min_tasks, 5);
        assert_eq!(config.generate.max_tasks, 10);
        assert_eq!(config.generate.names.len(), 15);
        assert_eq!(config.diagram.direction, Direction::Tb);
        assert_eq!(GlobalConfig::default().default_format, OutputFormat::Text);
    }

    #[test]
    fn parse_project_config() {
        let toml = r#"
max_chains = 3

[generate]
min_tasks = 2
max_tasks = 4
names = ["Plan", "Build", "Ship"]

[diagram]
direction = "lr"
"#;

        let config = Config::parse_project_config(toml).unwrap();
        assert_eq!(config.max_chains, 3);
        assert_eq!(config.generate.max_tasks, 4);
        assert_eq!(config.generate.names, vec!["Plan", "Build", "Ship"]);
        assert_eq!(config.diagram.direction, Direction::Lr);
    }

    #[test]
    fn partial_config_uses_defaults() {
        let config = Config::parse_project_config("max_chains = 2\n").unwrap();
        assert_eq!(config.max_chains, 2);
        assert_eq!(config.generate, GenerateOptions::default());
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            Config::parse_project_config("max_chains = 0\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            Config::parse_project_config("[generate]\nmin_tasks = 9\nmax_tasks = 3\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            Config::parse_project_config("max_chains = \"many\"\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn parse_global_config() {
        let config: GlobalConfig = toml::from_str("default_format = \"json\"\n").unwrap();
        assert_eq!(config.default_format, OutputFormat::Json);
    }

    #[test]
    fn find_project_root() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(PROJECT_DIR)).unwrap();

        let sub_dir = dir.path().join("sub").join("dir");
        fs::create_dir_all(&sub_dir).unwrap();

        let root = Config::find_project_root_from(&sub_dir);
        assert_eq!(root.as_deref(), Some(dir.path()));
    }

    #[test]
    fn for_project_reads_config_file() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(PROJECT_DIR)).unwrap();
        fs::write(
            dir.path().join(PROJECT_DIR).join("config.toml"),
            "max_chains = 4\n\n[diagram]\ndirection = \"rl\"\n",
        )
        .unwrap();

        let config = Config::for_project(dir.path()).unwrap();
        assert_eq!(config.project.max_chains, 4);
        assert_eq!(config.project.diagram.direction, Direction::Rl);
        assert_eq!(config.project_root.as_deref(), Some(dir.path()));
    }
}
