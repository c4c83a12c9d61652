//! Main CLI application structure

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use super::output::{Output, OutputFormat};
use super::{analysis, task};
use crate::domain::Direction;
use crate::storage::{Config, Project};

/// Environment variable holding a tracing filter, e.g. `hasse_cli=trace`
pub const LOG_ENV: &str = "HASSE_LOG";

#[derive(Parser)]
#[command(name = "hasse")]
#[command(author, version, about = "Partial-order analysis for task dependencies")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config, then text)
    #[arg(long, short = 'f', global = true, env = "HASSE_FORMAT")]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new hasse project
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,
    },

    /// Manage tasks
    #[command(subcommand)]
    Task(task::TaskCommands),

    /// Manage dependencies between tasks
    #[command(subcommand)]
    Dep(task::DepCommands),

    /// Remove every task and dependency
    Clear,

    /// Replace the graph with a randomly generated one
    Generate {
        /// Seed for a reproducible graph
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Recompute the analysis (minimal, maximal, order, chains)
    Analyze,

    /// Show the last computed analysis without recomputing
    Show,

    /// Check whether the last analysis has a chain of exactly SIZE tasks
    Chain {
        /// Number of tasks in the chain
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        size: u32,
    },

    /// Export the graph as Graphviz DOT
    Diagram {
        /// Layout direction: tb, lr, bt or rl (defaults to config)
        #[arg(long, short)]
        direction: Option<Direction>,
    },
}

/// Installs the tracing subscriber; `--verbose` raises the default level
fn init_logging(verbose: bool) {
    let default = if verbose { "hasse_cli=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    // A subscriber may already be installed when running inside tests
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .try_init();
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let format = match cli.format {
        Some(format) => format,
        None => Config::load()
            .map(|config| config.global.default_format.into())
            .unwrap_or_default(),
    };
    let output = Output::new(format, cli.verbose);

    output.verbose("hasse starting");

    match cli.command {
        Commands::Init { path } => {
            output.verbose_ctx("init", &format!("Initializing project at: {}", path));
            let project = Project::init(&path)?;
            output.verbose_ctx(
                "init",
                &format!("Created project directory at: {}", project.project_dir().display()),
            );
            output.success(&format!(
                "Initialized hasse project at {}",
                project.root().display()
            ));
        }

        Commands::Task(cmd) => task::run_task(cmd, &output)?,
        Commands::Dep(cmd) => task::run_dep(cmd, &output)?,

        Commands::Clear => analysis::clear(&output)?,
        Commands::Generate { seed } => analysis::generate(&output, seed)?,

        Commands::Analyze => analysis::analyze(&output)?,
        Commands::Show => analysis::show(&output)?,
        Commands::Chain { size } => analysis::chain(&output, size as usize)?,
        Commands::Diagram { direction } => analysis::diagram(&output, direction)?,
    }

    output.verbose("Command completed successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_dependency_add() {
        let cli = Cli::try_parse_from(["hasse", "dep", "add", "A", "B"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Dep(task::DepCommands::Add { ref from, ref to }) if from == "A" && to == "B"
        ));
    }

    #[test]
    fn chain_size_must_be_positive() {
        assert!(Cli::try_parse_from(["hasse", "chain", "0"]).is_err());
        assert!(Cli::try_parse_from(["hasse", "chain", "3"]).is_ok());
    }

    #[test]
    fn parses_direction() {
        let cli = Cli::try_parse_from(["hasse", "diagram", "--direction", "lr"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Diagram {
                direction: Some(Direction::Lr)
            }
        ));
        assert!(Cli::try_parse_from(["hasse", "diagram", "-d", "sideways"]).is_err());
    }
}
