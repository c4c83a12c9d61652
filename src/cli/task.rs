//! Task and dependency CLI commands
//!
//! Every command here mutates or lists the graph. None of them recompute
//! the analysis; run `hasse analyze` after a batch of edits.

use anyhow::Result;
use clap::Subcommand;

use super::output::Output;
use crate::domain::{classify, DependencyGraph, Outcome, TaskKind};
use crate::storage::Project;

#[derive(Subcommand)]
pub enum TaskCommands {
    /// Add one or more tasks
    ///
    /// Examples:
    ///   hasse task add Design
    ///   hasse task add Design Build Ship
    Add {
        /// Task names (surrounding whitespace is trimmed)
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Remove a task and every dependency that mentions it
    Remove {
        /// Task name
        name: String,
    },

    /// List tasks in insertion order
    List,
}

#[derive(Subcommand)]
pub enum DepCommands {
    /// Add a dependency: FROM must complete before TO
    Add {
        /// Task that must complete first
        from: String,

        /// Task that depends on FROM
        to: String,
    },

    /// Remove a dependency
    Remove {
        /// Task that must complete first
        from: String,

        /// Task that depends on FROM
        to: String,
    },

    /// List dependencies in insertion order
    List,

    /// Check whether adding a dependency would create a cycle
    Check {
        /// Task that must complete first
        from: String,

        /// Task that depends on FROM
        to: String,
    },
}

pub fn run_task(cmd: TaskCommands, output: &Output) -> Result<()> {
    match cmd {
        TaskCommands::Add { names } => add_tasks(output, &names),
        TaskCommands::Remove { name } => remove_task(output, &name),
        TaskCommands::List => list_tasks(output),
    }
}

pub fn run_dep(cmd: DepCommands, output: &Output) -> Result<()> {
    match cmd {
        DepCommands::Add { from, to } => add_dependency(output, &from, &to),
        DepCommands::Remove { from, to } => remove_dependency(output, &from, &to),
        DepCommands::List => list_dependencies(output),
        DepCommands::Check { from, to } => check_dependency(output, &from, &to),
    }
}

/// Loads the graph, applies the edits, and saves only if something changed
fn mutate<F>(output: &Output, context: &str, apply: F) -> Result<Vec<Outcome>>
where
    F: FnOnce(&mut DependencyGraph) -> Vec<Outcome>,
{
    let project = Project::open_current()?;
    output.verbose_ctx(
        context,
        &format!("Opened project at: {}", project.root().display()),
    );

    let mut graph = project.load_graph()?;
    let outcomes = apply(&mut graph);

    if outcomes.iter().any(|o| o.is_applied()) {
        project.save_graph(&graph)?;
        output.verbose_ctx(
            context,
            &format!("Saved graph at revision {}", graph.revision()),
        );
    }

    Ok(outcomes)
}

fn add_tasks(output: &Output, names: &[String]) -> Result<()> {
    let outcomes = mutate(output, "task add", |graph| {
        names.iter().map(|name| graph.add_task(name)).collect()
    })?;

    for (name, outcome) in names.iter().zip(outcomes) {
        output.outcome("Added", &format!("task '{}'", name.trim()), outcome);
    }

    Ok(())
}

fn remove_task(output: &Output, name: &str) -> Result<()> {
    let outcomes = mutate(output, "task remove", |graph| vec![graph.remove_task(name)])?;

    for outcome in outcomes {
        output.outcome("Removed", &format!("task '{}'", name.trim()), outcome);
    }

    Ok(())
}

fn list_tasks(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let graph = project.load_graph()?;

    let rows: Vec<(&str, TaskKind)> = graph
        .tasks()
        .iter()
        .map(|task| {
            let kind = classify(&graph, task.as_str()).unwrap_or(TaskKind::Isolated);
            (task.as_str(), kind)
        })
        .collect();

    if output.is_json() {
        let items: Vec<_> = rows
            .iter()
            .map(|(name, kind)| {
                serde_json::json!({
                    "name": name,
                    "kind": kind,
                })
            })
            .collect();
        output.data(&items);
    } else if rows.is_empty() {
        println!("No tasks.");
    } else {
        println!("Tasks ({}):", rows.len());
        println!("{:<24} KIND", "NAME");
        println!("{}", "-".repeat(40));
        for (name, kind) in rows {
            println!("{:<24} {}", name, kind.as_str());
        }
    }

    Ok(())
}

fn add_dependency(output: &Output, from: &str, to: &str) -> Result<()> {
    let outcomes = mutate(output, "dep add", |graph| vec![graph.add_dependency(from, to)])?;

    for outcome in outcomes {
        output.outcome(
            "Added",
            &format!("dependency {} -> {}", from.trim(), to.trim()),
            outcome,
        );
    }

    Ok(())
}

fn remove_dependency(output: &Output, from: &str, to: &str) -> Result<()> {
    let outcomes = mutate(output, "dep remove", |graph| {
        vec![graph.remove_dependency(from, to)]
    })?;

    for outcome in outcomes {
        output.outcome(
            "Removed",
            &format!("dependency {} -> {}", from.trim(), to.trim()),
            outcome,
        );
    }

    Ok(())
}

fn list_dependencies(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let graph = project.load_graph()?;

    if output.is_json() {
        let items: Vec<_> = graph
            .relations()
            .iter()
            .map(|rel| {
                serde_json::json!({
                    "from": rel.from,
                    "to": rel.to,
                })
            })
            .collect();
        output.data(&items);
    } else if graph.relations().is_empty() {
        println!("No dependencies.");
    } else {
        println!("Dependencies ({}):", graph.relations().len());
        for rel in graph.relations() {
            println!("  {} -> {}", rel.from, rel.to);
        }
    }

    Ok(())
}

fn check_dependency(output: &Output, from: &str, to: &str) -> Result<()> {
    let project = Project::open_current()?;
    let graph = project.load_graph()?;
    let cycle = graph.would_create_cycle(from, to);

    if output.is_json() {
        output.data(&serde_json::json!({
            "from": from.trim(),
            "to": to.trim(),
            "would_create_cycle": cycle,
        }));
    } else if cycle {
        println!("{} -> {} would create a cycle", from.trim(), to.trim());
    } else {
        println!("{} -> {} keeps the graph acyclic", from.trim(), to.trim());
    }

    Ok(())
}
