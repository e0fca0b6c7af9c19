#![allow(dead_code)]

use std::collections::HashSet;

use proptest::prelude::*;
use seqdag::graph::ProblemGraph;
use seqdag::sequence::SequencingResult;
use seqdag_test_utils::builders::ProblemBuilder;

pub use seqdag_test_utils::init_tracing;

/// `A -> B`, `B <-> C`, `C -> D`.
pub fn two_cycle() -> ProblemBuilder {
    ProblemBuilder::new()
        .tasks(&["A", "B", "C", "D"])
        .edge("A", "B")
        .edge("B", "C")
        .edge("C", "B")
        .edge("C", "D")
}

/// `A -> B -> C -> D -> E`.
pub fn chain() -> ProblemBuilder {
    ProblemBuilder::new().chain(&["A", "B", "C", "D", "E"])
}

pub fn task_name(i: usize) -> String {
    format!("t{i}")
}

/// Random problem with up to `max_tasks` tasks and arbitrary (possibly
/// cyclic) edges.
pub fn problem_strategy(max_tasks: usize) -> impl Strategy<Value = ProblemGraph> {
    (1..=max_tasks).prop_flat_map(|n| {
        proptest::collection::vec((0..n, 0..n), 0..(n * 3)).prop_map(move |edges| {
            let names: Vec<String> = (0..n).map(task_name).collect();
            let refs: Vec<&str> = names.iter().map(String::as_str).collect();
            let mut builder = ProblemBuilder::new().tasks(&refs);
            for (from, to) in edges {
                if from != to {
                    builder = builder.edge(&names[from], &names[to]);
                }
            }
            builder.build()
        })
    })
}

/// Random acyclic problem: task `i` only feeds tasks with a higher index.
pub fn dag_strategy(max_tasks: usize) -> impl Strategy<Value = ProblemGraph> {
    (1..=max_tasks).prop_flat_map(|n| {
        proptest::collection::vec((0..n, 0..n), 0..(n * 2)).prop_map(move |edges| {
            let names: Vec<String> = (0..n).map(task_name).collect();
            let refs: Vec<&str> = names.iter().map(String::as_str).collect();
            let mut builder = ProblemBuilder::new().tasks(&refs);
            for (a, b) in edges {
                if a != b {
                    let (from, to) = (a.min(b), a.max(b));
                    builder = builder.edge(&names[from], &names[to]);
                }
            }
            builder.build()
        })
    })
}

/// The order names every task of `problem` exactly once.
pub fn is_permutation_of_tasks(problem: &ProblemGraph, result: &SequencingResult) -> bool {
    let expected: HashSet<&str> = problem.tasks().iter().map(|t| t.name.as_str()).collect();
    let seen: HashSet<&str> = result.order.iter().map(String::as_str).collect();
    result.order.len() == problem.task_count() && seen == expected
}

/// Every backward matrix entry lies inside the coupled block.
pub fn feedback_stays_in_coupled_block(result: &SequencingResult) -> bool {
    let start = result.partition.pre_coupled.len();
    let end = start + result.partition.coupled.len();
    let n = result.matrix.len();
    (0..n).all(|i| {
        (0..i).all(|j| {
            result.matrix.get(i, j) == 0 || (start <= j && i < end)
        })
    })
}
