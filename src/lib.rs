// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod graph;
pub mod logging;
pub mod sequence;
pub mod types;

use std::path::PathBuf;

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::loader::load_from_path;
use crate::config::model::{ProblemFile, RawProblemFile};
use crate::sequence::{Partition, SequencingResult, partition_of, sequence};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - problem file loading and CLI overrides
/// - validation
/// - either a dry-run partition or a full sequencing pass
pub fn run(args: CliArgs) -> Result<()> {
    let problem_path = PathBuf::from(&args.problem);
    let mut raw = load_from_path(&problem_path)?;
    apply_overrides(&mut raw, &args);

    let problem = ProblemFile::try_from(raw)?;
    let graph = problem.to_graph()?;
    info!(
        tasks = graph.task_count(),
        items = graph.items().len(),
        method = %problem.method(),
        "problem loaded"
    );

    if args.dry_run {
        let partition = partition_of(&graph)?;
        print_dry_run(&problem, &partition);
        return Ok(());
    }

    let result = sequence(&graph, problem.to_options())?.require_non_empty()?;
    print_result(&result);
    Ok(())
}

/// CLI flags win over `[config]`.
fn apply_overrides(raw: &mut RawProblemFile, args: &CliArgs) {
    if let Some(ref method) = args.method {
        raw.config.method = method.clone();
    }
    if let Some(starts) = args.multi_start {
        raw.config.multi_start = Some(starts);
    }
    if let Some(seed) = args.seed {
        raw.config.seed = seed;
    }
    if let Some(workers) = args.workers {
        raw.config.workers = workers;
    }
}

fn print_dry_run(problem: &ProblemFile, partition: &Partition<String>) {
    println!("seqdag dry-run");
    println!("  config.method = {}", problem.method());
    if let Some(starts) = problem.config.multi_start {
        println!("  config.multi_start = {starts} (seed {})", problem.config.seed);
    }
    println!("  config.workers = {}", problem.config.workers);
    println!();

    println!("tasks ({}):", problem.task.len());
    for (name, task) in problem.task.iter() {
        println!("  - {name} [{}]", task.role);
        if !task.inputs.is_empty() {
            println!("      inputs: {:?}", task.inputs);
        }
        if !task.outputs.is_empty() {
            println!("      outputs: {:?}", task.outputs);
        }
    }
    println!();
    print_partition(partition);

    debug!("dry-run complete (coupled group left unordered)");
}

fn print_partition(partition: &Partition<String>) {
    println!("partition:");
    println!("  pre-coupled:  {:?}", partition.pre_coupled);
    println!("  coupled:      {:?}", partition.coupled);
    println!("  post-coupled: {:?}", partition.post_coupled);
}

fn print_result(result: &SequencingResult) {
    println!("method: {}", result.method);
    println!("order: {}", result.order.join(" -> "));
    println!("score: {}", result.score);
    for warning in &result.warnings {
        println!("warning: {warning}");
    }
    println!();
    print_partition(&result.partition);
    println!();
    println!("coupling matrix:");
    print!("{}", result.matrix);
}
