//! Analysis commands (analyze, show, chain, diagram) and whole-graph edits
//! (clear, generate)
//!
//! `analyze` is the only command that recomputes. `show` and `chain` read
//! the stored snapshot and warn when the graph changed since.

use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::output::Output;
use crate::domain::{generate as generate_graph, to_dot, AnalysisResult, Direction, TaskName};
use crate::storage::Project;

/// Recompute the analysis and store it
pub fn analyze(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let graph = project.load_graph()?;
    let mut cache = project.load_cache()?;

    output.verbose_ctx(
        "analyze",
        &format!(
            "Recomputing {} tasks, {} relations (max {} chains)",
            graph.len(),
            graph.relations().len(),
            cache.max_chains()
        ),
    );

    cache.recompute(&graph);
    project.save_cache(&cache)?;

    print_result(output, cache.result(), false);
    Ok(())
}

/// Print the stored analysis without recomputing
pub fn show(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let graph = project.load_graph()?;
    let cache = project.load_cache()?;

    let stale = cache.is_stale(&graph);
    if stale {
        output.warning("graph changed since the last analysis; run 'hasse analyze' to refresh");
    }

    print_result(output, cache.result(), stale);
    Ok(())
}

/// Report whether a cached chain has exactly `size` tasks
pub fn chain(output: &Output, size: usize) -> Result<()> {
    let project = Project::open_current()?;
    let graph = project.load_graph()?;
    let cache = project.load_cache()?;

    let stale = cache.is_stale(&graph);
    if stale {
        output.warning("graph changed since the last analysis; run 'hasse analyze' to refresh");
    }

    let exists = cache.has_chain_of_size(size);
    output.verbose_ctx(
        "chain",
        &format!("Checked {} cached chains", cache.result().chains.len()),
    );

    if output.is_json() {
        output.data(&serde_json::json!({
            "size": size,
            "exists": exists,
            "stale": stale,
        }));
    } else if exists {
        println!("A chain of size {} exists", size);
    } else {
        println!("No chain of size {}", size);
    }

    Ok(())
}

/// Export the graph as Graphviz DOT
pub fn diagram(output: &Output, direction: Option<Direction>) -> Result<()> {
    let project = Project::open_current()?;
    let graph = project.load_graph()?;
    let direction = direction.unwrap_or(project.config().project.diagram.direction);

    output.verbose_ctx("diagram", &format!("Rendering with direction {}", direction));
    let dot = to_dot(&graph, direction);

    if output.is_json() {
        output.data(&serde_json::json!({
            "direction": direction,
            "dot": dot,
        }));
    } else {
        print!("{}", dot);
    }

    Ok(())
}

/// Remove every task and dependency
pub fn clear(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let mut graph = project.load_graph()?;

    let (tasks, relations) = (graph.len(), graph.relations().len());
    graph.clear();
    project.save_graph(&graph)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "success": true,
            "removed_tasks": tasks,
            "removed_relations": relations,
        }));
    } else {
        output.success(&format!(
            "Cleared {} tasks and {} dependencies",
            tasks, relations
        ));
    }

    Ok(())
}

/// Replace the graph with a random one
pub fn generate(output: &Output, seed: Option<u64>) -> Result<()> {
    let project = Project::open_current()?;
    let mut graph = project.load_graph()?;

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    output.verbose_ctx("generate", &format!("Seed: {:?}", seed));

    let generated = generate_graph(&mut graph, &mut rng, &project.config().project.generate);
    project.save_graph(&graph)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "success": true,
            "tasks": graph.tasks(),
            "relations": graph.to_document().relations,
            "attempts": generated.attempts,
        }));
    } else {
        output.success(&format!(
            "Generated {} tasks and {} dependencies ({} attempts)",
            generated.tasks, generated.relations, generated.attempts
        ));
    }

    Ok(())
}

fn join(names: &[TaskName], separator: &str) -> String {
    names
        .iter()
        .map(|name| name.as_str())
        .collect::<Vec<_>>()
        .join(separator)
}

fn print_result(output: &Output, result: &AnalysisResult, stale: bool) {
    if output.is_json() {
        output.data(&serde_json::json!({
            "minimal": result.minimal,
            "maximal": result.maximal,
            "topological_order": result.topological_order,
            "chains": result.chains,
            "notation": result.notation,
            "task_count": result.task_count,
            "relation_count": result.relation_count,
            "revision": result.revision,
            "stale": stale,
        }));
        return;
    }

    println!(
        "Tasks: {}  Dependencies: {}",
        result.task_count, result.relation_count
    );
    println!("Minimal:   {}", join(&result.minimal, ", "));
    println!("Maximal:   {}", join(&result.maximal, ", "));
    println!("Order:     {}", join(&result.topological_order, ", "));
    println!("Relation:  {}", result.notation);

    if result.chains.is_empty() {
        println!("Chains:    none");
    } else {
        println!("Chains ({}):", result.chains.len());
        for (i, chain) in result.chains.iter().enumerate() {
            println!("  {}. {}  (length {})", i + 1, join(chain, " -> "), chain.len());
        }
    }
}
